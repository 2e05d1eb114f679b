use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::error;

use crate::domain::ports::Mailer;

// SMTP mailer used for support tickets. Connects over STARTTLS with the
// configured relay credentials.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
}

impl SmtpMailer {
    pub fn new(
        host: &str,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self, lettre::transport::smtp::Error> {
        let username = username.into();
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)?
            .credentials(Credentials::new(username.clone(), password.into()))
            .build();

        Ok(Self {
            transport,
            from: username,
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), String> {
        let message = Message::builder()
            .from(
                self.from
                    .parse()
                    .map_err(|err| format!("invalid sender address: {err}"))?,
            )
            .to(to
                .parse()
                .map_err(|err| format!("invalid recipient address: {err}"))?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|err| format!("failed to build email: {err}"))?;

        self.transport.send(message).await.map_err(|err| {
            error!(error = %err, "failed to send email");
            format!("failed to send email: {err}")
        })?;

        Ok(())
    }
}
