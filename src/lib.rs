//! Stochastic EV charging-site simulator: chargepoint sessions, arrival and
//! demand sampling, and a tick-based engine estimating energy use and peak
//! power demand.

#[cfg(feature = "api")]
pub mod api;
pub mod cli;
pub mod config;
pub mod devices;
pub mod error;
pub mod io;
pub mod logging;
pub mod probability;
/// Simulation clock, engine, sweep, and result types.
pub mod sim;

pub use error::SimError;
