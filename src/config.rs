//! TOML-based scenario configuration and preset definitions.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::devices::Chargepoint;
use crate::devices::chargepoint::{DEFAULT_CHARGE_POWER_KW, DEFAULT_CHARGEPOINT_COUNT};
use crate::error::SimError;
use crate::probability::{
    ArrivalProfile, ChargingDemandEntry, DEFAULT_ARRIVAL_PROBABILITY_PCT, DEFAULT_CHARGING_DEMAND,
    DemandDistribution, ProbabilityModel,
};
use crate::sim::types::{
    DEFAULT_EV_CONSUMPTION_KWH_PER_100KM, DEFAULT_MINUTES_PER_TICK, DEFAULT_SEED,
    DEFAULT_SIMULATION_DAYS, HOURS_PER_DAY, MINUTES_PER_HOUR, SimConfig,
};

/// Allowed distance of the demand table's total mass from 100 %.
const DEMAND_TOTAL_TOLERANCE_PCT: f64 = 1.0;

/// Top-level scenario configuration parsed from TOML.
///
/// All fields have defaults matching the baseline scenario. Load from
/// TOML with [`ScenarioConfig::from_toml_file`] or use
/// [`ScenarioConfig::baseline`] for the built-in default.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    /// Simulation horizon, tick resolution, and seed.
    #[serde(default)]
    pub simulation: SimulationConfig,
    /// Chargepoint count and rating.
    #[serde(default)]
    pub chargepoints: ChargepointConfig,
    /// Vehicle consumption and arrival scaling.
    #[serde(default)]
    pub ev: EvConfig,
    /// Hourly arrival probability table.
    #[serde(default)]
    pub arrival: ArrivalConfig,
    /// Charging-demand distribution, one `[[demand]]` table per bucket.
    #[serde(default = "default_demand_table")]
    pub demand: Vec<ChargingDemandEntry>,
    /// Concurrency sweep parameters.
    #[serde(default)]
    pub sweep: SweepConfig,
}

fn default_demand_table() -> Vec<ChargingDemandEntry> {
    DEFAULT_CHARGING_DEMAND.to_vec()
}

/// Simulation horizon, tick resolution, and seed.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Number of days to simulate (must be > 0).
    pub days: usize,
    /// Tick length in minutes (must divide 60).
    pub minutes_per_tick: u32,
    /// Master random seed.
    pub seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            days: DEFAULT_SIMULATION_DAYS,
            minutes_per_tick: DEFAULT_MINUTES_PER_TICK,
            seed: DEFAULT_SEED,
        }
    }
}

/// Chargepoint count and rating.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChargepointConfig {
    /// Number of identical chargepoints.
    pub count: usize,
    /// Rated power per chargepoint (kW).
    pub power_kw: f64,
}

impl Default for ChargepointConfig {
    fn default() -> Self {
        Self {
            count: DEFAULT_CHARGEPOINT_COUNT,
            power_kw: DEFAULT_CHARGE_POWER_KW,
        }
    }
}

/// Vehicle consumption and arrival scaling.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EvConfig {
    /// Energy consumption (kWh per 100 km).
    pub consumption_kwh_per_100km: f64,
    /// Scale applied to every hourly arrival probability (%; 100 = unchanged).
    pub arrival_multiplier_pct: f64,
}

impl Default for EvConfig {
    fn default() -> Self {
        Self {
            consumption_kwh_per_100km: DEFAULT_EV_CONSUMPTION_KWH_PER_100KM,
            arrival_multiplier_pct: 100.0,
        }
    }
}

/// Hourly arrival probability table.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ArrivalConfig {
    /// 24 percentages indexed by hour of day.
    pub probabilities_pct: Vec<f64>,
}

impl Default for ArrivalConfig {
    fn default() -> Self {
        Self {
            probabilities_pct: DEFAULT_ARRIVAL_PROBABILITY_PCT.to_vec(),
        }
    }
}

/// Concurrency sweep parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SweepConfig {
    /// Largest chargepoint count to simulate (sweep covers `1..=max`).
    pub max_chargepoints: usize,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            max_chargepoints: 30,
        }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("config error: {field} — {message}")]
pub struct ConfigError {
    /// Dotted field path (e.g., `"simulation.minutes_per_tick"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl ConfigError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl From<ConfigError> for SimError {
    fn from(e: ConfigError) -> Self {
        SimError::InvalidConfiguration {
            field: e.field,
            message: e.message,
        }
    }
}

/// Validated, ready-to-run pieces built from a [`ScenarioConfig`].
#[derive(Debug, Clone)]
pub struct Scenario {
    pub sim_config: SimConfig,
    pub model: ProbabilityModel,
    pub chargepoints: Vec<Chargepoint>,
}

impl ScenarioConfig {
    /// Returns the baseline scenario: 20 × 11 kW chargepoints for one year.
    pub fn baseline() -> Self {
        Self {
            simulation: SimulationConfig::default(),
            chargepoints: ChargepointConfig::default(),
            ev: EvConfig::default(),
            arrival: ArrivalConfig::default(),
            demand: default_demand_table(),
            sweep: SweepConfig::default(),
        }
    }

    /// Returns the fast-charging preset: fewer, faster 22 kW chargepoints.
    pub fn fast_charging() -> Self {
        Self {
            chargepoints: ChargepointConfig {
                count: 10,
                power_kw: 22.0,
            },
            ..Self::baseline()
        }
    }

    /// Returns the busy-depot preset: arrival rates doubled.
    pub fn busy_depot() -> Self {
        Self {
            ev: EvConfig {
                arrival_multiplier_pct: 200.0,
                ..EvConfig::default()
            },
            ..Self::baseline()
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["baseline", "fast_charging", "busy_depot"];

    /// Loads a scenario from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "baseline" => Ok(Self::baseline()),
            "fast_charging" => Ok(Self::fast_charging()),
            "busy_depot" => Ok(Self::busy_depot()),
            _ => Err(ConfigError::new(
                "preset",
                format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            )),
        }
    }

    /// Parses a scenario from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::new("scenario", format!("cannot read \"{}\": {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a scenario from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e: toml::de::Error| ConfigError::new("toml", e.to_string()))
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let s = &self.simulation;

        if s.days == 0 {
            errors.push(ConfigError::new("simulation.days", "must be > 0"));
        }
        if s.minutes_per_tick == 0 || MINUTES_PER_HOUR % s.minutes_per_tick != 0 {
            errors.push(ConfigError::new(
                "simulation.minutes_per_tick",
                format!("must evenly divide 60, got {}", s.minutes_per_tick),
            ));
        }

        let cp = &self.chargepoints;
        if !cp.power_kw.is_finite() || cp.power_kw <= 0.0 {
            errors.push(ConfigError::new("chargepoints.power_kw", "must be > 0"));
        }

        let ev = &self.ev;
        if !ev.consumption_kwh_per_100km.is_finite() || ev.consumption_kwh_per_100km <= 0.0 {
            errors.push(ConfigError::new(
                "ev.consumption_kwh_per_100km",
                "must be > 0",
            ));
        }
        if !ev.arrival_multiplier_pct.is_finite() || ev.arrival_multiplier_pct < 0.0 {
            errors.push(ConfigError::new("ev.arrival_multiplier_pct", "must be >= 0"));
        }

        let arrival = &self.arrival.probabilities_pct;
        if arrival.len() != HOURS_PER_DAY {
            errors.push(ConfigError::new(
                "arrival.probabilities_pct",
                format!("must have {HOURS_PER_DAY} entries, got {}", arrival.len()),
            ));
        }
        for (hour, p) in arrival.iter().enumerate() {
            if !(0.0..=100.0).contains(p) {
                errors.push(ConfigError::new(
                    format!("arrival.probabilities_pct[{hour}]"),
                    "must be in [0, 100]",
                ));
            }
        }

        if self.demand.is_empty() {
            errors.push(ConfigError::new("demand", "must have at least one entry"));
        }
        for (i, d) in self.demand.iter().enumerate() {
            if !(0.0..=100.0).contains(&d.probability_pct) {
                errors.push(ConfigError::new(
                    format!("demand[{i}].probability_pct"),
                    "must be in [0, 100]",
                ));
            }
            if !d.demand_km.is_finite() || d.demand_km < 0.0 {
                errors.push(ConfigError::new(
                    format!("demand[{i}].demand_km"),
                    "must be >= 0",
                ));
            }
        }
        let total: f64 = self.demand.iter().map(|d| d.probability_pct).sum();
        if !self.demand.is_empty() && (total - 100.0).abs() > DEMAND_TOTAL_TOLERANCE_PCT {
            errors.push(ConfigError::new(
                "demand",
                format!("probabilities must sum to ~100, got {total:.2}"),
            ));
        }

        if self.sweep.max_chargepoints == 0 {
            errors.push(ConfigError::new("sweep.max_chargepoints", "must be > 0"));
        }

        errors
    }

    /// Timing configuration for this scenario.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidConfiguration`] for invalid timing or
    /// consumption values.
    pub fn sim_config(&self) -> Result<SimConfig, SimError> {
        SimConfig::new(
            self.simulation.minutes_per_tick,
            self.simulation.days,
            self.ev.consumption_kwh_per_100km,
            self.simulation.seed,
        )
    }

    /// Probability model with the arrival multiplier applied.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidConfiguration`] for malformed tables.
    pub fn probability_model(&self) -> Result<ProbabilityModel, SimError> {
        let arrival = ArrivalProfile::new(&self.arrival.probabilities_pct)?
            .scaled(self.ev.arrival_multiplier_pct)?;
        let demand = DemandDistribution::new(self.demand.clone())?;
        Ok(ProbabilityModel::new(arrival, demand))
    }

    /// Builds the configured chargepoint fleet.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidConfiguration`] for a non-positive rating.
    pub fn build_chargepoints(&self, sim_config: &SimConfig) -> Result<Vec<Chargepoint>, SimError> {
        Chargepoint::fleet(self.chargepoints.count, self.chargepoints.power_kw, sim_config)
    }

    /// Validates the whole scenario and builds every runtime piece.
    ///
    /// # Errors
    ///
    /// Returns the first validation error as [`SimError::InvalidConfiguration`].
    pub fn build(&self) -> Result<Scenario, SimError> {
        if let Some(first) = self.validate().into_iter().next() {
            return Err(first.into());
        }
        let sim_config = self.sim_config()?;
        let model = self.probability_model()?;
        let chargepoints = self.build_chargepoints(&sim_config)?;
        Ok(Scenario {
            sim_config,
            model,
            chargepoints,
        })
    }
}
