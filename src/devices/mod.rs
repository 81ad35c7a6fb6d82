//! Charging hardware modeled by the simulator.

/// Single charging bay with a session state machine.
pub mod chargepoint;

pub use chargepoint::{ChargeState, Chargepoint};
