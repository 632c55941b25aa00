use std::sync::Arc;

use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use flightbook::config::AppConfig;
use flightbook::db::{BookingStore, SqliteBookingStore};
use flightbook::handlers;
use flightbook::services::inventory::{HttpInventoryClient, InventoryService};
use flightbook::services::BookingService;
use flightbook::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();

    let store: Arc<dyn BookingStore> = Arc::new(SqliteBookingStore::open(&config.database_url)?);
    let inventory: Arc<dyn InventoryService> = Arc::new(HttpInventoryClient::from_config(&config)?);

    tracing::info!(
        inventory_url = %config.inventory_service_url,
        timeout_ms = config.inventory_timeout.as_millis() as u64,
        max_concurrency = config.inventory_max_concurrency,
        "using flight inventory service"
    );
    if config.forward_idempotency_key {
        tracing::info!("forwarding Idempotency-Key headers on reserve/release calls");
    }

    let state = Arc::new(AppState {
        bookings: BookingService::new(&config, inventory, store),
        config: config.clone(),
    });

    let app = handlers::router(state).layer(TraceLayer::new_for_http());

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
