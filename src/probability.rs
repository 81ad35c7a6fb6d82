//! Arrival and charging-demand samplers.
//!
//! Both tables are immutable once built. Randomness is never ambient: every
//! sampling call borrows the caller's generator, so a seeded run is
//! reproducible end to end.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::SimError;
use crate::sim::types::HOURS_PER_DAY;

/// Hourly probability (%) that a vehicle arrives at an idle chargepoint.
pub const DEFAULT_ARRIVAL_PROBABILITY_PCT: [f64; HOURS_PER_DAY] = [
    0.94, 0.94, 0.94, 0.94, 0.94, 0.94, 0.94, 0.94, 2.83, 2.83, 5.66, 5.66, 5.66, 7.55, 7.55, 7.55,
    10.38, 10.38, 10.38, 4.72, 4.72, 4.72, 0.94, 0.94,
];

/// Distribution of charging demand for an arriving vehicle.
pub const DEFAULT_CHARGING_DEMAND: [ChargingDemandEntry; 9] = [
    ChargingDemandEntry::new(34.31, 0.0),
    ChargingDemandEntry::new(4.90, 5.0),
    ChargingDemandEntry::new(9.80, 10.0),
    ChargingDemandEntry::new(11.76, 20.0),
    ChargingDemandEntry::new(8.82, 30.0),
    ChargingDemandEntry::new(11.76, 50.0),
    ChargingDemandEntry::new(10.78, 100.0),
    ChargingDemandEntry::new(4.90, 200.0),
    ChargingDemandEntry::new(2.94, 300.0),
];

/// Draws a uniform percentage in `[0, 100)`.
pub fn draw_percent<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    rng.random::<f64>() * 100.0
}

/// One bucket of the charging-demand distribution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChargingDemandEntry {
    /// Probability mass of this bucket (%).
    pub probability_pct: f64,
    /// Distance-equivalent energy need (km). Zero means no charging need.
    pub demand_km: f64,
}

impl ChargingDemandEntry {
    pub const fn new(probability_pct: f64, demand_km: f64) -> Self {
        Self {
            probability_pct,
            demand_km,
        }
    }
}

/// 24-entry table of hourly arrival probabilities, indexed by hour of day.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrivalProfile {
    probabilities_pct: [f64; HOURS_PER_DAY],
}

impl ArrivalProfile {
    /// Builds a profile from exactly 24 percentages.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidConfiguration`] if the table does not have
    /// 24 entries or any entry is negative or not finite.
    pub fn new(probabilities_pct: &[f64]) -> Result<Self, SimError> {
        let table: [f64; HOURS_PER_DAY] = probabilities_pct.try_into().map_err(|_| {
            SimError::invalid(
                "arrival.probabilities_pct",
                format!(
                    "expected {HOURS_PER_DAY} hourly entries, got {}",
                    probabilities_pct.len()
                ),
            )
        })?;

        if let Some(hour) = table.iter().position(|p| !p.is_finite() || *p < 0.0) {
            return Err(SimError::invalid(
                format!("arrival.probabilities_pct[{hour}]"),
                "must be a non-negative number",
            ));
        }

        Ok(Self {
            probabilities_pct: table,
        })
    }

    /// Returns a copy with every hour scaled by `multiplier_pct / 100`.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidConfiguration`] for a negative or
    /// non-finite multiplier.
    pub fn scaled(&self, multiplier_pct: f64) -> Result<Self, SimError> {
        if !multiplier_pct.is_finite() || multiplier_pct < 0.0 {
            return Err(SimError::invalid(
                "ev.arrival_multiplier_pct",
                "must be a non-negative number",
            ));
        }
        let factor = multiplier_pct / 100.0;
        Ok(Self {
            probabilities_pct: self.probabilities_pct.map(|p| p * factor),
        })
    }

    /// Returns the arrival probability (%) for `hour`.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::OutOfRange`] if `hour > 23`.
    pub fn probability(&self, hour: usize) -> Result<f64, SimError> {
        self.probabilities_pct
            .get(hour)
            .copied()
            .ok_or(SimError::OutOfRange { hour })
    }
}

impl Default for ArrivalProfile {
    fn default() -> Self {
        Self {
            probabilities_pct: DEFAULT_ARRIVAL_PROBABILITY_PCT,
        }
    }
}

/// Discrete charging-demand distribution.
#[derive(Debug, Clone, PartialEq)]
pub struct DemandDistribution {
    entries: Vec<ChargingDemandEntry>,
}

impl DemandDistribution {
    /// Builds a distribution from its buckets.
    ///
    /// Probabilities are expected to sum to roughly 100; a shortfall only
    /// means some draws fall through to a demand of zero.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidConfiguration`] if the table is empty or an
    /// entry has a negative or non-finite probability or demand.
    pub fn new(entries: Vec<ChargingDemandEntry>) -> Result<Self, SimError> {
        if entries.is_empty() {
            return Err(SimError::invalid("demand", "table must not be empty"));
        }
        for (i, e) in entries.iter().enumerate() {
            if !e.probability_pct.is_finite() || e.probability_pct < 0.0 {
                return Err(SimError::invalid(
                    format!("demand[{i}].probability_pct"),
                    "must be a non-negative number",
                ));
            }
            if !e.demand_km.is_finite() || e.demand_km < 0.0 {
                return Err(SimError::invalid(
                    format!("demand[{i}].demand_km"),
                    "must be a non-negative number",
                ));
            }
        }
        Ok(Self { entries })
    }

    /// Sum of all bucket probabilities (%).
    pub fn total_probability(&self) -> f64 {
        self.entries.iter().map(|e| e.probability_pct).sum()
    }

    /// Maps a percentage draw in `[0, 100)` onto a bucket's demand.
    ///
    /// Walks the table accumulating probability and returns the first bucket
    /// whose cumulative mass reaches the draw, or `0.0` when the table is
    /// exhausted.
    pub fn demand_for_draw(&self, draw_pct: f64) -> f64 {
        let mut cumulative = 0.0;
        for entry in &self.entries {
            cumulative += entry.probability_pct;
            if draw_pct <= cumulative {
                return entry.demand_km;
            }
        }
        0.0
    }

    /// Samples a demand in km.
    pub fn sample_km<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        self.demand_for_draw(draw_percent(rng))
    }
}

impl Default for DemandDistribution {
    fn default() -> Self {
        Self {
            entries: DEFAULT_CHARGING_DEMAND.to_vec(),
        }
    }
}

/// Arrival and demand samplers used by the simulation engine.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProbabilityModel {
    arrival: ArrivalProfile,
    demand: DemandDistribution,
}

impl ProbabilityModel {
    pub fn new(arrival: ArrivalProfile, demand: DemandDistribution) -> Self {
        Self { arrival, demand }
    }

    /// Hourly arrival probability (%) for `hour`.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::OutOfRange`] if `hour > 23`.
    pub fn arrival_probability(&self, hour: usize) -> Result<f64, SimError> {
        self.arrival.probability(hour)
    }

    /// Per-tick arrival probability (%): the hourly value divided evenly
    /// across the ticks of that hour.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::OutOfRange`] if `hour > 23`.
    pub fn interval_arrival_probability(
        &self,
        hour: usize,
        ticks_per_hour: u32,
    ) -> Result<f64, SimError> {
        Ok(self.arrival_probability(hour)? / f64::from(ticks_per_hour))
    }

    /// Whether a vehicle arrives within `hour`, at hourly granularity.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::OutOfRange`] if `hour > 23`.
    pub fn does_ev_arrive<R: Rng + ?Sized>(
        &self,
        hour: usize,
        rng: &mut R,
    ) -> Result<bool, SimError> {
        let probability = self.arrival_probability(hour)?;
        Ok(draw_percent(rng) < probability)
    }

    /// Samples the charging demand (km) of an arriving vehicle.
    pub fn sample_charging_demand_km<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        self.demand.sample_km(rng)
    }
}
