use super::types::HOURS_PER_DAY;

/// Position of one tick within the simulated horizon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickTime {
    /// Global tick index from the start of the run.
    pub step: usize,
    pub day: usize,
    /// Hour of day, `0..24`.
    pub hour: usize,
    /// Tick within the hour, `0..ticks_per_hour`.
    pub tick: usize,
}

/// A simulation clock that walks days, hours, and ticks in strict order.
///
/// The clock is the flattened form of the `day → hour → tick` nested loop:
/// every tick of hour 0 of day 0 comes first, then hour 1, and so on.
///
/// # Examples
///
/// ```
/// use ev_charge_sim::sim::clock::Clock;
///
/// let mut clock = Clock::new(1, 2);
/// let mut hours = Vec::new();
///
/// clock.run(|t| hours.push((t.hour, t.tick)));
/// assert_eq!(hours.len(), 48);
/// assert_eq!(hours[..3], [(0, 0), (0, 1), (1, 0)]);
/// ```
pub struct Clock {
    /// Next global tick to hand out
    current: usize,
    ticks_per_hour: usize,
    /// Total ticks to run
    total: usize,
}

impl Clock {
    /// Creates a clock covering `days` days at `ticks_per_hour` resolution.
    pub fn new(days: usize, ticks_per_hour: usize) -> Self {
        Self {
            current: 0,
            ticks_per_hour,
            total: days
                .saturating_mul(HOURS_PER_DAY)
                .saturating_mul(ticks_per_hour),
        }
    }

    /// Advances the clock by one tick.
    ///
    /// # Returns
    ///
    /// * `Some(time)` - The tick position before advancing
    /// * `None` - If the clock has run through every tick
    pub fn tick(&mut self) -> Option<TickTime> {
        if self.current >= self.total {
            return None;
        }

        let step = self.current;
        self.current += 1;

        let ticks_per_day = HOURS_PER_DAY * self.ticks_per_hour;
        let within_day = step % ticks_per_day;
        Some(TickTime {
            step,
            day: step / ticks_per_day,
            hour: within_day / self.ticks_per_hour,
            tick: within_day % self.ticks_per_hour,
        })
    }

    /// Runs a function for each remaining tick.
    pub fn run(&mut self, mut f: impl FnMut(TickTime)) {
        while let Some(time) = self.tick() {
            f(time);
        }
    }

    /// Runs a fallible function for each remaining tick, stopping at the
    /// first error.
    pub fn try_run<E>(&mut self, mut f: impl FnMut(TickTime) -> Result<(), E>) -> Result<(), E> {
        while let Some(time) = self.tick() {
            f(time)?;
        }
        Ok(())
    }

    /// Total ticks this clock covers.
    pub fn total(&self) -> usize {
        self.total
    }
}
