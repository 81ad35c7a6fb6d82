//! Request handlers for the API endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use super::AppState;
use super::types::{ErrorResponse, SummaryResponse, TraceQuery};
use crate::sim::types::TickRecord;

/// Returns simulation config, result, and the latest tick record.
///
/// `GET /summary` → 200 + `SummaryResponse` JSON
pub async fn get_summary(State(state): State<Arc<AppState>>) -> Json<SummaryResponse> {
    Json(SummaryResponse {
        config: state.config.clone(),
        result: state.result.clone(),
        latest_tick: state.trace.last().cloned(),
    })
}

/// Returns trace records, optionally filtered by step range.
///
/// `GET /trace` → 200 + `Vec<TickRecord>` JSON
/// `GET /trace?from=N&to=M` → filtered range (inclusive)
/// `GET /trace?from=10&to=5` → 400 + `ErrorResponse`
pub async fn get_trace(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TraceQuery>,
) -> impl IntoResponse {
    let from = query.from.unwrap_or(0);
    let to = query.to.unwrap_or(usize::MAX);

    if from > to {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: format!("`from` ({from}) must be <= `to` ({to})"),
            }),
        ));
    }

    let records: Vec<TickRecord> = state
        .trace
        .iter()
        .filter(|r| r.step >= from && r.step <= to)
        .cloned()
        .collect();

    Ok(Json(records))
}

/// Returns the sweep report.
///
/// `GET /sweep` → 200 + `SweepReport` JSON, or 404 when no sweep was run
pub async fn get_sweep(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match &state.sweep {
        Some(report) => Ok(Json(report.clone())),
        None => Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: "no sweep was run; start with --sweep".to_string(),
            }),
        )),
    }
}
