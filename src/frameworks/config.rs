use std::env;

// Runtime configuration pulled from the environment (.env in development).
#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    // GeoDB key; nearby-city lookups degrade to an empty list without it.
    pub rapidapi_key: String,
    pub smtp_host: String,
    pub smtp_username: String,
    pub smtp_password: String,
    pub support_inbox: String,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        Ok(Self {
            database_url: require("DATABASE_URL")?,
            port: env::var("PORT")
                .ok()
                .and_then(|raw| raw.parse().ok())
                .unwrap_or(8080),
            rapidapi_key: env::var("RAPIDAPI_KEY").unwrap_or_default(),
            smtp_host: require("SMTP_HOST")?,
            smtp_username: require("SMTP_USERNAME")?,
            smtp_password: require("SMTP_PASSWORD")?,
            support_inbox: require("SUPPORT_INBOX")?,
        })
    }
}

fn require(key: &str) -> Result<String, String> {
    env::var(key).map_err(|_| format!("{key} is not set"))
}
