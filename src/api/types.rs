//! API response and query types.

use serde::{Deserialize, Serialize};

use crate::sim::types::{SimConfig, SimulationResult, TickRecord};

/// Combined summary response: config, result, and latest trace record.
#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    /// Simulation configuration.
    pub config: SimConfig,
    /// Aggregate result of the run.
    pub result: SimulationResult,
    /// Most recent tick record; `null` when no trace was recorded.
    pub latest_tick: Option<TickRecord>,
}

/// Optional range query parameters for the trace endpoint.
#[derive(Debug, Deserialize)]
pub struct TraceQuery {
    /// Start step (inclusive).
    pub from: Option<usize>,
    /// End step (inclusive).
    pub to: Option<usize>,
}

/// Error response body for 4xx errors.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub error: String,
}
