//! Core simulation types: timing configuration, per-tick records, and results.

use std::fmt;

use serde::Serialize;

use crate::error::SimError;

/// Hours in a simulated day.
pub const HOURS_PER_DAY: usize = 24;
/// Minutes in an hour; tick lengths must divide this evenly.
pub const MINUTES_PER_HOUR: u32 = 60;
/// Default tick resolution in minutes.
pub const DEFAULT_MINUTES_PER_TICK: u32 = 15;
/// Default simulated horizon (one year).
pub const DEFAULT_SIMULATION_DAYS: usize = 365;
/// Default EV energy consumption in kWh per 100 km.
pub const DEFAULT_EV_CONSUMPTION_KWH_PER_100KM: f64 = 18.0;
/// Default master seed.
pub const DEFAULT_SEED: u64 = 42;

/// Centralized simulation configuration.
///
/// Chargepoints and the engine read their timing from this struct, so
/// `ticks_per_hour` and `dt_hours` are derived once here.
///
/// # Examples
///
/// ```
/// use ev_charge_sim::sim::types::SimConfig;
///
/// let cfg = SimConfig::new(15, 2, 18.0, 42).unwrap();
/// assert_eq!(cfg.ticks_per_hour(), 4);
/// assert_eq!(cfg.dt_hours(), 0.25);
/// assert_eq!(cfg.total_ticks(), 2 * 24 * 4);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimConfig {
    /// Length of one tick in minutes.
    minutes_per_tick: u32,
    /// Ticks per hour, derived as `60 / minutes_per_tick`.
    ticks_per_hour: u32,
    /// Duration of one tick in hours.
    dt_hours: f64,
    days: usize,
    /// EV energy consumption used to convert demand km into kWh.
    ev_consumption_kwh_per_100km: f64,
    /// Master random seed for reproducibility.
    seed: u64,
}

impl SimConfig {
    /// Creates a new simulation configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidConfiguration`] if `minutes_per_tick` is
    /// zero or does not divide 60, if `days` is zero, or if the consumption
    /// rate is not a positive finite number, or if the horizon's tick count
    /// overflows `usize`.
    pub fn new(
        minutes_per_tick: u32,
        days: usize,
        ev_consumption_kwh_per_100km: f64,
        seed: u64,
    ) -> Result<Self, SimError> {
        if minutes_per_tick == 0 || MINUTES_PER_HOUR % minutes_per_tick != 0 {
            return Err(SimError::invalid(
                "simulation.minutes_per_tick",
                format!("must evenly divide 60, got {minutes_per_tick}"),
            ));
        }
        if days == 0 {
            return Err(SimError::invalid("simulation.days", "must be > 0"));
        }
        if !ev_consumption_kwh_per_100km.is_finite() || ev_consumption_kwh_per_100km <= 0.0 {
            return Err(SimError::invalid(
                "ev.consumption_kwh_per_100km",
                "must be a positive number",
            ));
        }

        let ticks_per_hour = MINUTES_PER_HOUR / minutes_per_tick;
        if horizon_ticks(days, ticks_per_hour).is_none() {
            return Err(SimError::invalid(
                "simulation.days",
                format!("{days} days overflow the tick counter"),
            ));
        }
        Ok(Self {
            minutes_per_tick,
            ticks_per_hour,
            dt_hours: 1.0 / f64::from(ticks_per_hour),
            days,
            ev_consumption_kwh_per_100km,
            seed,
        })
    }

    pub fn minutes_per_tick(&self) -> u32 {
        self.minutes_per_tick
    }

    pub fn ticks_per_hour(&self) -> u32 {
        self.ticks_per_hour
    }

    /// Duration of one tick in hours.
    pub fn dt_hours(&self) -> f64 {
        self.dt_hours
    }

    /// Number of days to simulate.
    pub fn days(&self) -> usize {
        self.days
    }

    pub fn ev_consumption_kwh_per_100km(&self) -> f64 {
        self.ev_consumption_kwh_per_100km
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Ticks in one simulated day.
    pub fn ticks_per_day(&self) -> usize {
        HOURS_PER_DAY * self.ticks_per_hour as usize
    }

    /// Total number of ticks across all days.
    pub fn total_ticks(&self) -> usize {
        self.days * self.ticks_per_day()
    }
}

/// Total ticks for `days` days, or `None` on overflow.
pub fn horizon_ticks(days: usize, ticks_per_hour: u32) -> Option<usize> {
    days.checked_mul(HOURS_PER_DAY)?
        .checked_mul(ticks_per_hour as usize)
}

impl Default for SimConfig {
    fn default() -> Self {
        let ticks_per_hour = MINUTES_PER_HOUR / DEFAULT_MINUTES_PER_TICK;
        Self {
            minutes_per_tick: DEFAULT_MINUTES_PER_TICK,
            ticks_per_hour,
            dt_hours: 1.0 / f64::from(ticks_per_hour),
            days: DEFAULT_SIMULATION_DAYS,
            ev_consumption_kwh_per_100km: DEFAULT_EV_CONSUMPTION_KWH_PER_100KM,
            seed: DEFAULT_SEED,
        }
    }
}

/// Aggregate power observation for one tick.
///
/// Recorded after arrivals are evaluated and before chargepoints advance,
/// the same observation point the peak tracker uses.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickRecord {
    /// Global tick index from the start of the run.
    pub step: usize,
    pub day: usize,
    pub hour: usize,
    /// Tick index within the hour.
    pub tick: usize,
    /// Simulated time in hours since the start of the run.
    pub time_hr: f64,
    /// Summed instantaneous draw across all chargepoints (kW).
    pub power_kw: f64,
    /// Number of chargepoints drawing power.
    pub active_chargepoints: usize,
}

/// Summary of one simulation run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationResult {
    /// Energy delivered across all chargepoints (kWh).
    pub total_energy_consumed_kwh: f64,
    /// Sum of rated power over all chargepoints (kW).
    pub theoretical_max_power_demand_kw: f64,
    /// Highest observed simultaneous draw (kW).
    pub actual_max_power_demand_kw: f64,
    /// `actual / theoretical * 100`, or `0.0` when nothing could draw power.
    pub concurrency_factor_pct: f64,
    /// Charging sessions started during the run.
    pub total_charging_sessions: u64,
    /// Number of ticks simulated.
    pub ticks_simulated: usize,
}

impl SimulationResult {
    /// Computes the concurrency factor in percent.
    ///
    /// A zero theoretical maximum (no chargepoints) yields `0.0`.
    pub fn concurrency_factor(actual_kw: f64, theoretical_kw: f64) -> f64 {
        if theoretical_kw > 0.0 {
            actual_kw / theoretical_kw * 100.0
        } else {
            0.0
        }
    }
}

impl fmt::Display for SimulationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Simulation Results ---")?;
        writeln!(
            f,
            "Total energy consumed:            {:.2} kWh",
            self.total_energy_consumed_kwh
        )?;
        writeln!(
            f,
            "Theoretical maximum power demand: {:.2} kW",
            self.theoretical_max_power_demand_kw
        )?;
        writeln!(
            f,
            "Actual maximum power demand:      {:.2} kW",
            self.actual_max_power_demand_kw
        )?;
        writeln!(
            f,
            "Concurrency factor:               {:.2}%",
            self.concurrency_factor_pct
        )?;
        write!(
            f,
            "Charging sessions:                {}",
            self.total_charging_sessions
        )
    }
}

/// Result plus the optional per-tick trace of one run.
#[derive(Debug, Clone)]
pub struct SimulationRun {
    pub result: SimulationResult,
    /// Empty unless tracing was enabled on the engine.
    pub trace: Vec<TickRecord>,
}
