use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use crate::frameworks::config::Config;
use crate::frameworks::db;
use crate::interface_adapters::clients::geo::GeoClient;
use crate::interface_adapters::clients::mail::SmtpMailer;
use crate::interface_adapters::routes;
use crate::interface_adapters::state::AppState;

const GEO_TIMEOUT: Duration = Duration::from_secs(5);
const CITY_CACHE_TTL: Duration = Duration::from_secs(60 * 60);
const CITY_CACHE_MAX_ENTRIES: usize = 1000;

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .init();
    }

    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
    }));
}

pub async fn run() {
    // Load .env locally; safe to ignore when not present.
    let _ = dotenvy::dotenv();
    init_tracing();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(error) => {
            tracing::error!(%error, "invalid configuration");
            return;
        }
    };

    let db = match db::connect_pool(&config.database_url).await {
        Ok(db) => db,
        Err(error) => {
            tracing::error!(%error, "failed to connect to database");
            return;
        }
    };
    if let Err(error) = db::run_migrations(&db).await {
        tracing::error!(%error, "failed to run migrations");
        return;
    }

    let geo = match GeoClient::new(
        config.rapidapi_key.clone(),
        GEO_TIMEOUT,
        CITY_CACHE_TTL,
        CITY_CACHE_MAX_ENTRIES,
    ) {
        Ok(geo) => geo,
        Err(error) => {
            tracing::error!(%error, "failed to build geolocation client");
            return;
        }
    };
    let mailer = match SmtpMailer::new(
        &config.smtp_host,
        config.smtp_username.clone(),
        config.smtp_password.clone(),
    ) {
        Ok(mailer) => mailer,
        Err(error) => {
            tracing::error!(%error, "failed to build smtp transport");
            return;
        }
    };

    let state = AppState {
        db,
        geo: Arc::new(geo),
        mailer: Arc::new(mailer),
        support_inbox: config.support_inbox,
    };

    // Wire the HTTP routes for the reservation API.
    let app = routes::app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!(%addr, "listening");

    // Bind TCP listener with error handling.
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(error) => {
            tracing::error!(%addr, %error, "failed to bind");
            return;
        }
    };

    // Serve app and report errors rather than panicking.
    if let Err(error) = axum::serve(listener, app).await {
        tracing::error!(%error, "server error");
    }
}
