use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use certificate_ledger::api::{self, AppState};
use certificate_ledger::config::AppConfig;
use certificate_ledger::ledger::{CertificateLedger, LedgerStore, SqliteLedger};
use certificate_ledger::verifier::Verifier;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = AppConfig::load()?;

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_filter.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting certificate ledger service");

    // This service only reads; writes arrive through cert-issuer, which
    // also creates the database.
    let store = match SqliteLedger::connect(&config.ledger_url).await {
        Ok(store) => store,
        Err(e) => {
            error!("Failed to open ledger at {}: {}", config.ledger_url, e);
            return Err(e.into());
        }
    };
    match store.admin().await {
        Ok(admin) => info!("Ledger admin is {}", admin),
        Err(e) => warn!("Ledger not initialized yet: {}", e),
    }

    let ledger = CertificateLedger::new(Arc::new(store));
    let state = AppState::new(Verifier::new(ledger));
    let app = api::router(state);

    // Start server
    let addr = config.socket_addr()?;
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
