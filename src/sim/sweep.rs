//! Concurrency-factor sweep over increasing chargepoint counts.

use std::fmt;

use rand::Rng;
use serde::Serialize;
use tracing::info;

use crate::devices::Chargepoint;
use crate::error::SimError;

use super::engine::Engine;

/// Peak demand observed for one chargepoint count.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SweepRow {
    pub chargepoints: usize,
    pub actual_max_power_kw: f64,
    pub concurrency_factor_pct: f64,
}

/// Direction of the concurrency factor as the site grows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Increasing,
    Decreasing,
    /// Fewer than two rows, nothing to compare.
    Flat,
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Increasing => "increasing",
            Self::Decreasing => "decreasing",
            Self::Flat => "flat",
        };
        f.write_str(s)
    }
}

/// Sweep rows plus summary statistics of the concurrency factor.
#[derive(Debug, Clone, Serialize)]
pub struct SweepReport {
    pub rows: Vec<SweepRow>,
    pub min_pct: f64,
    pub max_pct: f64,
    pub average_pct: f64,
    /// `Increasing` iff the second half of rows averages higher than the first.
    pub trend: Trend,
}

impl SweepReport {
    /// Computes summary statistics from completed sweep rows.
    pub fn from_rows(rows: Vec<SweepRow>) -> Self {
        if rows.is_empty() {
            return Self {
                rows,
                min_pct: 0.0,
                max_pct: 0.0,
                average_pct: 0.0,
                trend: Trend::Flat,
            };
        }

        let factors: Vec<f64> = rows.iter().map(|r| r.concurrency_factor_pct).collect();
        let min_pct = factors.iter().copied().fold(f64::INFINITY, f64::min);
        let max_pct = factors.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let average_pct = mean(&factors);

        let trend = if factors.len() < 2 {
            Trend::Flat
        } else {
            let (first, second) = factors.split_at(factors.len() / 2);
            if mean(second) > mean(first) {
                Trend::Increasing
            } else {
                Trend::Decreasing
            }
        };

        Self {
            rows,
            min_pct,
            max_pct,
            average_pct,
            trend,
        }
    }
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Runs one full simulation per chargepoint count `1..=max_chargepoints`.
///
/// Each count gets a fresh fleet of identical chargepoints. All runs share
/// the engine's random source in order, so the whole sweep is reproducible
/// from one seed.
///
/// # Errors
///
/// Propagates configuration errors from fleet construction or the engine.
pub fn run_sweep<R: Rng>(
    engine: &mut Engine<R>,
    charge_power_kw: f64,
    max_chargepoints: usize,
) -> Result<SweepReport, SimError> {
    let mut rows = Vec::with_capacity(max_chargepoints);

    for count in 1..=max_chargepoints {
        let mut fleet = Chargepoint::fleet(count, charge_power_kw, engine.config())?;
        let run = engine.run(&mut fleet)?;
        rows.push(SweepRow {
            chargepoints: count,
            actual_max_power_kw: run.result.actual_max_power_demand_kw,
            concurrency_factor_pct: run.result.concurrency_factor_pct,
        });
    }

    let report = SweepReport::from_rows(rows);
    info!(
        runs = report.rows.len(),
        min_pct = report.min_pct,
        max_pct = report.max_pct,
        trend = %report.trend,
        "concurrency sweep complete"
    );
    Ok(report)
}

impl fmt::Display for SweepReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Concurrency Factor Analysis ---")?;
        writeln!(f, "Chargepoints | Max Power (kW) | Concurrency Factor (%)")?;
        writeln!(f, "-------------|----------------|-----------------------")?;
        for r in &self.rows {
            writeln!(
                f,
                "{:>12} | {:>14.2} | {:>22.2}",
                r.chargepoints, r.actual_max_power_kw, r.concurrency_factor_pct
            )?;
        }
        writeln!(f)?;
        writeln!(f, "Minimum: {:.2}%", self.min_pct)?;
        writeln!(f, "Maximum: {:.2}%", self.max_pct)?;
        writeln!(f, "Average: {:.2}%", self.average_pct)?;
        write!(
            f,
            "Trend: concurrency factor tends to be {} as the number of chargepoints increases",
            self.trend
        )
    }
}
