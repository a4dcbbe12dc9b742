//! HTTP server.
//!
//! Provides four endpoints:
//! - `/hotels` - nearby hotels with a free room, priced for a stay, as GeoJSON
//! - `/recommendations` - recommended hotels, as GeoJSON
//! - `/reservation` - books rooms at one hotel (POST)
//! - `/status` - JSON counters and index load state
//!
//! Client errors map to 400, an exceeded request deadline to 504 and every
//! other failure to 500, each with a `{"error": ...}` body.

mod handlers;
mod types;

use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use handlers::{hotels_handler, recommendations_handler, reservation_handler, status_handler};
pub use types::{AppState, StatusResponse};

/// Builds the router over a wired search stack
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/hotels", get(hotels_handler))
        .route("/recommendations", get(recommendations_handler))
        .route("/reservation", post(reservation_handler))
        .route("/status", get(status_handler))
        .with_state(state)
}

/// Serves on an already bound listener until `shutdown` is cancelled
pub async fn serve(
    listener: TcpListener,
    state: AppState,
    shutdown: CancellationToken,
) -> Result<(), anyhow::Error> {
    let addr = listener
        .local_addr()
        .map_err(|e| anyhow::anyhow!("Failed to read listener address: {}", e))?;
    log::info!("Hotel search listening on http://{}/", addr);
    log::info!("  - Search: http://{}/hotels", addr);
    log::info!("  - Recommendations: http://{}/recommendations", addr);
    log::info!("  - Reservation: http://{}/reservation", addr);
    log::info!("  - Status: http://{}/status", addr);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    log::info!("Server on {} stopped", addr);
    Ok(())
}
