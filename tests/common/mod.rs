//! Shared test fixtures for integration tests.

#![allow(dead_code)]

use rand::rngs::StdRng;

use ev_charge_sim::devices::Chargepoint;
use ev_charge_sim::probability::ProbabilityModel;
use ev_charge_sim::sim::engine::Engine;
use ev_charge_sim::sim::types::SimConfig;

/// Quarter-hour ticks, 18 kWh/100 km, `days` days, seed 42.
pub fn config_for_days(days: usize) -> SimConfig {
    SimConfig::new(15, days, 18.0, 42).expect("valid config")
}

/// `count` chargepoints rated at 11 kW.
pub fn fleet(count: usize, config: &SimConfig) -> Vec<Chargepoint> {
    Chargepoint::fleet(count, 11.0, config).expect("valid fleet")
}

/// Engine with the default probability tables, seeded from the config.
pub fn default_engine(config: &SimConfig) -> Engine<StdRng> {
    Engine::seeded(config.clone(), ProbabilityModel::default())
}
