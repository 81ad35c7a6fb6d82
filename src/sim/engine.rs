//! Simulation engine that advances every chargepoint in lockstep and
//! aggregates site-level power and energy.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, trace};

use crate::devices::Chargepoint;
use crate::error::SimError;
use crate::probability::{ProbabilityModel, draw_percent};

use super::clock::{Clock, TickTime};
use super::types::{
    HOURS_PER_DAY, SimConfig, SimulationResult, SimulationRun, TickRecord, horizon_ticks,
};

/// Simulation engine owning the configuration, probability model, and the
/// random source.
///
/// Generic over `R: Rng` so tests can inject a scripted or seeded source.
/// The engine is the only user of the generator, which keeps consecutive
/// runs reproducible from a single seed.
pub struct Engine<R: Rng> {
    config: SimConfig,
    model: ProbabilityModel,
    rng: R,
    record_trace: bool,
}

impl Engine<StdRng> {
    /// Creates an engine whose generator is seeded from `config.seed`.
    pub fn seeded(config: SimConfig, model: ProbabilityModel) -> Self {
        let rng = StdRng::seed_from_u64(config.seed());
        Self::new(config, model, rng)
    }
}

impl<R: Rng> Engine<R> {
    /// Creates a new simulation engine.
    ///
    /// # Arguments
    ///
    /// * `config` - Timing and consumption configuration
    /// * `model` - Arrival and demand samplers
    /// * `rng` - Random source, owned by the engine for its lifetime
    pub fn new(config: SimConfig, model: ProbabilityModel, rng: R) -> Self {
        Self {
            config,
            model,
            rng,
            record_trace: false,
        }
    }

    /// Enables or disables recording of a per-tick power trace.
    pub fn with_trace(mut self, enabled: bool) -> Self {
        self.record_trace = enabled;
        self
    }

    /// Runs the simulation for the configured number of days.
    ///
    /// # Errors
    ///
    /// See [`Engine::run_simulation`].
    pub fn run(&mut self, chargepoints: &mut [Chargepoint]) -> Result<SimulationRun, SimError> {
        self.run_simulation(chargepoints, self.config.days())
    }

    /// Resets every chargepoint, simulates `days` days tick by tick, and
    /// aggregates the result.
    ///
    /// Within a tick chargepoints are visited in slice order. An idle
    /// chargepoint first checks for an arrival, then its draw is added to
    /// the tick total, then it advances. A session started in a tick is
    /// therefore counted in that tick's draw.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidConfiguration`] if `days` is zero or too
    /// large to count in ticks, or if a chargepoint was built for a different
    /// tick resolution or consumption rate. Nothing is simulated in that case.
    pub fn run_simulation(
        &mut self,
        chargepoints: &mut [Chargepoint],
        days: usize,
    ) -> Result<SimulationRun, SimError> {
        if days == 0 {
            return Err(SimError::invalid("simulation.days", "must be > 0"));
        }
        let ticks_per_hour = self.config.ticks_per_hour();
        let Some(total_ticks) = horizon_ticks(days, ticks_per_hour) else {
            return Err(SimError::invalid(
                "simulation.days",
                format!("{days} days overflow the tick counter"),
            ));
        };
        for cp in chargepoints.iter() {
            if cp.ticks_per_hour() != ticks_per_hour {
                return Err(SimError::invalid(
                    "chargepoints",
                    format!(
                        "chargepoint {} uses {} ticks/hour, engine uses {ticks_per_hour}",
                        cp.id(),
                        cp.ticks_per_hour(),
                    ),
                ));
            }
            if cp.ev_consumption_kwh_per_100km() != self.config.ev_consumption_kwh_per_100km() {
                return Err(SimError::invalid(
                    "chargepoints",
                    format!(
                        "chargepoint {} assumes {} kWh/100 km, engine uses {}",
                        cp.id(),
                        cp.ev_consumption_kwh_per_100km(),
                        self.config.ev_consumption_kwh_per_100km()
                    ),
                ));
            }
        }

        chargepoints.iter_mut().for_each(Chargepoint::reset);

        let ticks_per_hour = ticks_per_hour as usize;
        let mut clock = Clock::new(days, ticks_per_hour);
        info!(
            chargepoints = chargepoints.len(),
            days,
            ticks_per_hour,
            "starting simulation run"
        );

        let mut trace = if self.record_trace {
            Vec::with_capacity(total_ticks)
        } else {
            Vec::new()
        };
        let mut max_power_kw = 0.0_f64;
        let mut day_peak_kw = 0.0_f64;

        clock.try_run(|time| {
            let record = self.step(time, chargepoints)?;

            max_power_kw = max_power_kw.max(record.power_kw);
            day_peak_kw = day_peak_kw.max(record.power_kw);
            if time.hour + 1 == HOURS_PER_DAY && time.tick + 1 == ticks_per_hour {
                debug!(day = time.day, peak_kw = day_peak_kw, "day complete");
                day_peak_kw = 0.0;
            }

            if self.record_trace {
                trace.push(record);
            }
            Ok::<(), SimError>(())
        })?;

        let result = aggregate(chargepoints, max_power_kw, total_ticks);
        info!(
            energy_kwh = result.total_energy_consumed_kwh,
            peak_kw = result.actual_max_power_demand_kw,
            concurrency_pct = result.concurrency_factor_pct,
            sessions = result.total_charging_sessions,
            "simulation run complete"
        );

        Ok(SimulationRun { result, trace })
    }

    /// Executes one tick across all chargepoints and returns the observed
    /// site draw.
    fn step(
        &mut self,
        time: TickTime,
        chargepoints: &mut [Chargepoint],
    ) -> Result<TickRecord, SimError> {
        let interval_probability = self
            .model
            .interval_arrival_probability(time.hour, self.config.ticks_per_hour())?;

        let mut power_kw = 0.0;
        let mut active_chargepoints = 0;

        for cp in chargepoints.iter_mut() {
            if !cp.is_occupied() && draw_percent(&mut self.rng) < interval_probability {
                let demand_km = self.model.sample_charging_demand_km(&mut self.rng);
                if demand_km > 0.0 && cp.start_charging(demand_km) {
                    trace!(
                        chargepoint = cp.id(),
                        step = time.step,
                        demand_km,
                        ticks = cp.remaining_ticks(),
                        "session started"
                    );
                }
            }

            let draw_kw = cp.current_power_kw();
            if draw_kw > 0.0 {
                active_chargepoints += 1;
            }
            power_kw += draw_kw;

            cp.tick();
        }

        Ok(TickRecord {
            step: time.step,
            day: time.day,
            hour: time.hour,
            tick: time.tick,
            time_hr: time.step as f64 * self.config.dt_hours(),
            power_kw,
            active_chargepoints,
        })
    }

    /// Returns a reference to the simulation configuration.
    pub fn config(&self) -> &SimConfig {
        &self.config
    }
}

/// Folds per-chargepoint totals into the run summary.
fn aggregate(chargepoints: &[Chargepoint], max_power_kw: f64, ticks: usize) -> SimulationResult {
    let total_energy_consumed_kwh = chargepoints
        .iter()
        .map(Chargepoint::total_energy_consumed_kwh)
        .sum();
    let theoretical_max_power_demand_kw: f64 =
        chargepoints.iter().map(Chargepoint::charge_power_kw).sum();
    let total_charging_sessions = chargepoints.iter().map(Chargepoint::total_charges).sum();

    SimulationResult {
        total_energy_consumed_kwh,
        theoretical_max_power_demand_kw,
        actual_max_power_demand_kw: max_power_kw,
        concurrency_factor_pct: SimulationResult::concurrency_factor(
            max_power_kw,
            theoretical_max_power_demand_kw,
        ),
        total_charging_sessions,
        ticks_simulated: ticks,
    }
}
