//! Zentra Site Server
//!
//! Serves the site's records, admin login, public submissions and image
//! uploads over HTTP.
//!
//! # Configuration
//!
//! Uses the same configuration as the `zentra` CLI (config file plus
//! `ZENTRA_*` environment variables), and additionally:
//! - `ZENTRA_PORT`: Port to listen on (default: 8080)
//! - `ZENTRA_CONFIG`: Path to config file (default: ~/.config/zentra/config.yaml)
//!
//! # Endpoints
//!
//! - `GET /health`: Health check
//! - `POST /auth/login`: Check admin credentials
//! - `GET|POST /collections/{name}`: List or create records
//! - `PATCH|DELETE /collections/{name}/{id}`: Update or delete a record
//! - `POST /submit/booking`, `POST /submit/review`: Public form submissions
//! - `POST /images?name=<file>`: Upload an image

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use zentra_site::config::Config;
use zentra_site::email::EmailSender;
use zentra_site::local::{seed_defaults, SqliteStore};
use zentra_site::server::{router, AppState};
use zentra_site::store::DataStore;
use zentra_site::submit::SubmissionService;

fn port_from_env() -> u16 {
    std::env::var("ZENTRA_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080)
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "zentra_site=info,zentra_server=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run().await {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = std::env::var("ZENTRA_CONFIG").ok().map(PathBuf::from);
    let config = Config::load(config_path)?;

    tracing::info!(
        "Local store: {} ({})",
        config.database_path.value.display(),
        config.database_path.source
    );

    let local = Arc::new(SqliteStore::open(&config.database_path.value).await?);
    let seeded = seed_defaults(local.as_ref()).await?;
    if seeded > 0 {
        tracing::info!("Seeded {} collection(s) with demo content", seeded);
    }

    let store = DataStore::from_config(&config.firebase, local);
    let email = EmailSender::new(config.email.clone());
    if !email.is_configured() {
        tracing::warn!("Resend API key not configured. Notifications are disabled.");
    }

    let state = AppState::new(SubmissionService::new(store, email));
    let app = router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port_from_env()));
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
