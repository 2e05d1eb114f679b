use chrono::{Local, NaiveDateTime};
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::ports::{Clock, GeoProvider, Mailer};

// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub geo: Arc<dyn GeoProvider>,
    pub mailer: Arc<dyn Mailer>,
    // Inbox that receives support tickets.
    pub support_inbox: String,
}

// System clock adapter; reservations and capacity windows use local time.
#[derive(Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}
