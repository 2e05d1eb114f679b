use std::sync::Arc;

use tracing::error;

use crate::domain::ports::Mailer;
use crate::interface_adapters::protocol::BasicResponse;

// Relays support tickets to the shared support inbox.
pub struct SupportService {
    pub mailer: Arc<dyn Mailer>,
    pub inbox: String,
}

impl SupportService {
    pub async fn send_email(&self, user_email: &str, subject: &str, body: &str) -> BasicResponse {
        let subject = format!("Support Ticket from {user_email} - {subject}");

        if let Err(err) = self.mailer.send(&self.inbox, &subject, body).await {
            error!(error = %err, "failed to send support email");
            return BasicResponse::fail(
                "There was an error while sending the email. Please try again later.",
            );
        }

        BasicResponse::ok("Email sent successfully.")
    }
}
