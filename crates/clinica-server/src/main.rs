//! # clinica-server
//!
//! Companion HTTP server for the clinic management client.
//!
//! This binary provides:
//! - **Email relaying**: forwards appointment notification emails to an
//!   upstream mail relay so the client never carries mail credentials
//! - **Invoice storage**: accepts generated sale invoice PDFs and serves
//!   them back under stable download links
//! - **Per-IP rate limiting** to protect against abuse

mod api;
mod config;
mod error;
mod invoice_store;
mod mailer;
mod rate_limit;

use std::sync::Arc;
use std::time::Duration;

use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::api::AppState;
use crate::config::ServerConfig;
use crate::invoice_store::InvoiceStore;
use crate::mailer::Mailer;
use crate::rate_limit::RateLimiter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // -----------------------------------------------------------------------
    // 1. Initialize tracing (respects RUST_LOG env var)
    // -----------------------------------------------------------------------
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,clinica_server=debug")),
        )
        .init();

    info!("Starting Clinica server v{}", env!("CARGO_PKG_VERSION"));

    // -----------------------------------------------------------------------
    // 2. Load configuration
    // -----------------------------------------------------------------------
    let config = ServerConfig::from_env();
    info!(?config, "Loaded configuration");
    info!(
        instance = %config.instance_name,
        email_enabled = config.mail_relay_url.is_some(),
        uploads_gated = config.admin_token.is_some(),
        "Instance settings"
    );

    // -----------------------------------------------------------------------
    // 3. Initialize subsystems
    // -----------------------------------------------------------------------

    // Invoice store (creates directory if missing)
    let invoice_store = Arc::new(
        InvoiceStore::new(config.invoice_storage_path.clone(), config.max_invoice_size).await?,
    );

    let mailer = Mailer::new(config.mail_relay_url.clone());

    let rate_limiter = RateLimiter::default();

    let app_state = AppState {
        invoice_store,
        mailer,
        rate_limiter: rate_limiter.clone(),
        config: Arc::new(config.clone()),
    };

    // -----------------------------------------------------------------------
    // 4. Spawn background tasks
    // -----------------------------------------------------------------------

    // Periodic rate limiter cleanup (every 5 minutes, evict buckets idle >10 min)
    let rl = rate_limiter.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(300));
        loop {
            interval.tick().await;
            rl.purge_stale(Duration::from_secs(600)).await;
        }
    });

    // -----------------------------------------------------------------------
    // 5. Run the HTTP API server (blocks until shutdown)
    // -----------------------------------------------------------------------
    tokio::select! {
        result = api::serve(app_state, config.http_addr) => {
            if let Err(e) = result {
                tracing::error!(error = %e, "HTTP server failed");
                return Err(e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
        }
    }

    Ok(())
}
