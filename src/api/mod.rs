//! REST API for simulation results.
//!
//! Provides three GET endpoints:
//! - `/summary`: simulation config, result, and the last recorded tick
//! - `/trace`: per-tick power records with optional range filtering
//! - `/sweep`: concurrency sweep report, when one was run

mod handlers;
mod types;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tracing::info;

use crate::error::SimError;
use crate::sim::sweep::SweepReport;
use crate::sim::types::{SimConfig, SimulationResult, TickRecord};

pub use types::{ErrorResponse, SummaryResponse, TraceQuery};

/// Immutable application state shared across all request handlers.
///
/// Constructed once after the simulation run completes and wrapped in
/// `Arc`. All data is read-only, so no locks are needed.
pub struct AppState {
    /// Simulation configuration used for this run.
    pub config: SimConfig,
    /// Aggregate result of the run.
    pub result: SimulationResult,
    /// Per-tick power trace.
    pub trace: Vec<TickRecord>,
    /// Sweep report, if a sweep was requested.
    pub sweep: Option<SweepReport>,
}

/// Builds the axum router with all API routes.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/summary", get(handlers::get_summary))
        .route("/trace", get(handlers::get_trace))
        .route("/sweep", get(handlers::get_sweep))
        .with_state(state)
}

/// Binds to the given address and serves the API until the server stops.
///
/// # Errors
///
/// Returns [`SimError::Io`] if the listener cannot bind or the server fails.
pub async fn serve(state: Arc<AppState>, addr: SocketAddr) -> Result<(), SimError> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "API server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
