use crate::error::SimError;
use crate::sim::types::SimConfig;

/// Default rated power of a chargepoint in kilowatts.
pub const DEFAULT_CHARGE_POWER_KW: f64 = 11.0;
/// Default number of chargepoints in a site.
pub const DEFAULT_CHARGEPOINT_COUNT: usize = 20;

/// Session state of a chargepoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChargeState {
    Idle,
    /// A vehicle is charging; the session ends on the tick that brings
    /// `remaining_ticks` to zero.
    Charging { remaining_ticks: u32 },
}

/// A single charging bay.
///
/// Each arriving vehicle with a positive demand becomes a session that draws
/// the full rated power for a whole number of ticks. The duration is the
/// energy demand divided by the rated power, rounded up to the next tick, so
/// a session never under-delivers. Energy accrues for every tick the session
/// is active, including the final partial one.
///
/// # Power Flow Convention
/// Draw is always **positive** (load on the site connection).
///
/// # Examples
///
/// ```
/// use ev_charge_sim::devices::Chargepoint;
/// use ev_charge_sim::sim::types::SimConfig;
///
/// let cfg = SimConfig::default();
/// let mut cp = Chargepoint::new("bay-1", 11.0, &cfg).unwrap();
///
/// // 100 km at 18 kWh/100 km = 18 kWh → 1.64 h at 11 kW → 7 quarter-hour ticks
/// assert!(cp.start_charging(100.0));
/// assert_eq!(cp.remaining_ticks(), 7);
/// assert_eq!(cp.current_power_kw(), 11.0);
/// ```
#[derive(Debug, Clone)]
pub struct Chargepoint {
    id: String,
    /// Rated charging power in kilowatts.
    charge_power_kw: f64,
    ev_consumption_kwh_per_100km: f64,
    ticks_per_hour: u32,
    state: ChargeState,
    total_charges: u64,
    total_energy_consumed_kwh: f64,
}

impl Chargepoint {
    /// Creates an idle chargepoint.
    ///
    /// # Arguments
    ///
    /// * `id` - Identifier, unique within a simulation run
    /// * `charge_power_kw` - Rated power in kW (must be > 0)
    /// * `config` - Simulation configuration for tick length and EV consumption
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidConfiguration`] if `charge_power_kw` is not
    /// a positive finite number.
    pub fn new(
        id: impl Into<String>,
        charge_power_kw: f64,
        config: &SimConfig,
    ) -> Result<Self, SimError> {
        if !charge_power_kw.is_finite() || charge_power_kw <= 0.0 {
            return Err(SimError::invalid(
                "chargepoints.power_kw",
                format!("must be > 0, got {charge_power_kw}"),
            ));
        }

        Ok(Self {
            id: id.into(),
            charge_power_kw,
            ev_consumption_kwh_per_100km: config.ev_consumption_kwh_per_100km(),
            ticks_per_hour: config.ticks_per_hour(),
            state: ChargeState::Idle,
            total_charges: 0,
            total_energy_consumed_kwh: 0.0,
        })
    }

    /// Creates `count` identical chargepoints with ids `cp-01`, `cp-02`, ...
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidConfiguration`] if `charge_power_kw` is
    /// invalid.
    pub fn fleet(
        count: usize,
        charge_power_kw: f64,
        config: &SimConfig,
    ) -> Result<Vec<Self>, SimError> {
        (1..=count)
            .map(|n| Self::new(format!("cp-{n:02}"), charge_power_kw, config))
            .collect()
    }

    /// Number of ticks a session with `demand_km` occupies this chargepoint.
    ///
    /// Returns 0 for a non-positive demand.
    pub fn charging_ticks_for(&self, demand_km: f64) -> u32 {
        if demand_km <= 0.0 {
            return 0;
        }
        let energy_demand_kwh = demand_km / 100.0 * self.ev_consumption_kwh_per_100km;
        let duration_hours = energy_demand_kwh / self.charge_power_kw;
        let ticks = (duration_hours * f64::from(self.ticks_per_hour)).ceil();
        (ticks as u32).max(1)
    }

    /// Starts a session for a vehicle needing `demand_km` of range.
    ///
    /// Does nothing if a session is already running or the demand is not
    /// positive.
    ///
    /// # Returns
    ///
    /// `true` if a new session started.
    pub fn start_charging(&mut self, demand_km: f64) -> bool {
        if self.is_occupied() || demand_km <= 0.0 {
            return false;
        }

        let remaining_ticks = self.charging_ticks_for(demand_km);
        self.state = ChargeState::Charging { remaining_ticks };
        self.total_charges += 1;
        true
    }

    /// Advances the chargepoint by one tick.
    ///
    /// While charging, accrues one tick of energy at rated power and counts
    /// the session down, releasing the bay when it reaches zero.
    pub fn tick(&mut self) {
        let ChargeState::Charging { remaining_ticks } = self.state else {
            return;
        };

        self.total_energy_consumed_kwh += self.charge_power_kw / f64::from(self.ticks_per_hour);

        let remaining_ticks = remaining_ticks.saturating_sub(1);
        self.state = if remaining_ticks == 0 {
            ChargeState::Idle
        } else {
            ChargeState::Charging { remaining_ticks }
        };
    }

    /// Current draw: the rated power while charging, otherwise zero.
    pub fn current_power_kw(&self) -> f64 {
        if self.is_occupied() {
            self.charge_power_kw
        } else {
            0.0
        }
    }

    /// Returns to idle and clears all counters.
    pub fn reset(&mut self) {
        self.state = ChargeState::Idle;
        self.total_charges = 0;
        self.total_energy_consumed_kwh = 0.0;
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn charge_power_kw(&self) -> f64 {
        self.charge_power_kw
    }

    /// Tick resolution this chargepoint was built for.
    pub fn ticks_per_hour(&self) -> u32 {
        self.ticks_per_hour
    }

    /// Consumption rate used to turn demand km into energy.
    pub fn ev_consumption_kwh_per_100km(&self) -> f64 {
        self.ev_consumption_kwh_per_100km
    }

    pub fn state(&self) -> ChargeState {
        self.state
    }

    pub fn is_occupied(&self) -> bool {
        matches!(self.state, ChargeState::Charging { .. })
    }

    /// Ticks left in the current session; 0 when idle.
    pub fn remaining_ticks(&self) -> u32 {
        match self.state {
            ChargeState::Idle => 0,
            ChargeState::Charging { remaining_ticks } => remaining_ticks,
        }
    }

    /// Sessions started since the last reset.
    pub fn total_charges(&self) -> u64 {
        self.total_charges
    }

    /// Energy delivered since the last reset (kWh).
    pub fn total_energy_consumed_kwh(&self) -> f64 {
        self.total_energy_consumed_kwh
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> SimConfig {
        SimConfig::default()
    }

    fn cp(power: f64) -> Chargepoint {
        Chargepoint::new("test", power, &cfg()).expect("valid chargepoint")
    }

    #[test]
    fn starts_idle_with_zero_counters() {
        let c = cp(11.0);
        assert_eq!(c.state(), ChargeState::Idle);
        assert_eq!(c.remaining_ticks(), 0);
        assert_eq!(c.total_charges(), 0);
        assert_eq!(c.total_energy_consumed_kwh(), 0.0);
        assert_eq!(c.current_power_kw(), 0.0);
    }

    #[test]
    fn rejects_non_positive_power() {
        assert!(Chargepoint::new("a", 0.0, &cfg()).is_err());
        assert!(Chargepoint::new("b", -11.0, &cfg()).is_err());
        assert!(Chargepoint::new("c", f64::INFINITY, &cfg()).is_err());
    }

    #[test]
    fn hundred_km_at_eleven_kw_takes_seven_ticks() {
        let mut c = cp(11.0);
        assert!(c.start_charging(100.0));
        assert!(c.is_occupied());
        assert_eq!(c.remaining_ticks(), 7);
        assert_eq!(c.total_charges(), 1);
    }

    #[test]
    fn short_session_completes_after_one_tick() {
        let mut c = cp(11.0);
        assert!(c.start_charging(5.0));
        assert_eq!(c.remaining_ticks(), 1);

        c.tick();
        assert!(!c.is_occupied());
        assert_eq!(c.remaining_ticks(), 0);
        assert_eq!(c.current_power_kw(), 0.0);
        assert!((c.total_energy_consumed_kwh() - 2.75).abs() < 1e-12);
    }

    #[test]
    fn remaining_ticks_match_ceiling_formula() {
        let config = cfg();
        for power in [3.7, 7.4, 11.0, 22.0, 50.0, 150.0] {
            for demand in [1.0, 5.0, 10.0, 20.0, 33.3, 50.0, 100.0, 200.0, 300.0] {
                let mut c = Chargepoint::new("p", power, &config).unwrap();
                c.start_charging(demand);
                let expected =
                    (demand / 100.0 * 18.0 / power * f64::from(config.ticks_per_hour())).ceil();
                assert_eq!(
                    c.remaining_ticks(),
                    expected as u32,
                    "power={power} demand={demand}"
                );
                assert!(c.remaining_ticks() >= 1);
            }
        }
    }

    #[test]
    fn start_is_noop_when_occupied_or_demand_not_positive() {
        let mut c = cp(11.0);
        assert!(!c.start_charging(0.0));
        assert!(!c.start_charging(-10.0));
        assert_eq!(c.state(), ChargeState::Idle);
        assert_eq!(c.total_charges(), 0);

        c.start_charging(100.0);
        c.tick();
        let before = (c.state(), c.total_charges(), c.total_energy_consumed_kwh());
        assert!(!c.start_charging(300.0));
        assert_eq!(
            (c.state(), c.total_charges(), c.total_energy_consumed_kwh()),
            before
        );
    }

    #[test]
    fn ticking_counts_down_to_release() {
        let mut c = cp(11.0);
        c.start_charging(100.0);
        let ticks = c.remaining_ticks();

        for n in 1..ticks {
            c.tick();
            assert!(c.is_occupied(), "released early after {n} ticks");
            assert_eq!(c.remaining_ticks(), ticks - n);
            assert_eq!(c.current_power_kw(), 11.0);
        }

        c.tick();
        assert!(!c.is_occupied());
        assert_eq!(c.remaining_ticks(), 0);
        assert_eq!(c.current_power_kw(), 0.0);
        // 7 ticks at 11 kW for a quarter hour each
        assert!((c.total_energy_consumed_kwh() - 7.0 * 2.75).abs() < 1e-9);
    }

    #[test]
    fn delivered_energy_covers_demand() {
        let mut c = cp(11.0);
        c.start_charging(100.0);
        while c.is_occupied() {
            c.tick();
        }
        assert!(c.total_energy_consumed_kwh() >= 18.0);
    }

    #[test]
    fn idle_tick_is_noop() {
        let mut c = cp(11.0);
        c.tick();
        assert_eq!(c.state(), ChargeState::Idle);
        assert_eq!(c.total_energy_consumed_kwh(), 0.0);
    }

    #[test]
    fn reset_clears_everything() {
        let mut c = cp(22.0);
        c.start_charging(300.0);
        c.tick();
        c.tick();
        c.reset();
        assert_eq!(c.state(), ChargeState::Idle);
        assert_eq!(c.remaining_ticks(), 0);
        assert_eq!(c.total_charges(), 0);
        assert_eq!(c.total_energy_consumed_kwh(), 0.0);

        // Idempotent
        c.reset();
        assert_eq!(c.state(), ChargeState::Idle);
    }

    #[test]
    fn hourly_ticks_change_quantization() {
        let config = SimConfig::new(60, 1, 18.0, 0).unwrap();
        let mut c = Chargepoint::new("h", 11.0, &config).unwrap();
        c.start_charging(100.0);
        // 1.64 h rounds up to 2 hourly ticks
        assert_eq!(c.remaining_ticks(), 2);
        c.tick();
        assert!((c.total_energy_consumed_kwh() - 11.0).abs() < 1e-12);
    }

    #[test]
    fn fleet_assigns_unique_ids() {
        let fleet = Chargepoint::fleet(12, 11.0, &cfg()).unwrap();
        assert_eq!(fleet.len(), 12);
        assert_eq!(fleet[0].id(), "cp-01");
        assert_eq!(fleet[11].id(), "cp-12");
        assert!(Chargepoint::fleet(3, 0.0, &cfg()).is_err());
        assert!(Chargepoint::fleet(0, 11.0, &cfg()).unwrap().is_empty());
    }
}
