//! CSV export for tick traces and sweep tables.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::error::SimError;
use crate::sim::sweep::SweepRow;
use crate::sim::types::TickRecord;

/// Column header for the per-tick trace.
pub const TRACE_HEADER: &str = "step,day,hour,tick,time_hr,power_kw,active_chargepoints";

/// Column header for the concurrency sweep table.
pub const SWEEP_HEADER: &str = "chargepoints,actual_max_power_kw,concurrency_factor_pct";

/// Exports a tick trace to a CSV file at the given path.
///
/// # Errors
///
/// Returns [`SimError::Io`] or [`SimError::Csv`] if creating or writing the
/// file fails.
pub fn export_trace_csv(trace: &[TickRecord], path: &Path) -> Result<(), SimError> {
    let file = File::create(path)?;
    write_trace_csv(trace, io::BufWriter::new(file))
}

/// Writes a tick trace as CSV to any writer.
///
/// One header row, then one row per tick. Output is deterministic for
/// identical input.
///
/// # Errors
///
/// Returns [`SimError::Csv`] if writing fails.
pub fn write_trace_csv(trace: &[TickRecord], writer: impl Write) -> Result<(), SimError> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    wtr.write_record(TRACE_HEADER.split(','))?;

    for r in trace {
        wtr.write_record(&[
            r.step.to_string(),
            r.day.to_string(),
            r.hour.to_string(),
            r.tick.to_string(),
            format!("{:.2}", r.time_hr),
            format!("{:.4}", r.power_kw),
            r.active_chargepoints.to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Exports sweep rows to a CSV file at the given path.
///
/// # Errors
///
/// Returns [`SimError::Io`] or [`SimError::Csv`] if creating or writing the
/// file fails.
pub fn export_sweep_csv(rows: &[SweepRow], path: &Path) -> Result<(), SimError> {
    let file = File::create(path)?;
    write_sweep_csv(rows, io::BufWriter::new(file))
}

/// Writes sweep rows as CSV to any writer.
///
/// # Errors
///
/// Returns [`SimError::Csv`] if writing fails.
pub fn write_sweep_csv(rows: &[SweepRow], writer: impl Write) -> Result<(), SimError> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    wtr.write_record(SWEEP_HEADER.split(','))?;
    for r in rows {
        wtr.write_record(&[
            r.chargepoints.to_string(),
            format!("{:.4}", r.actual_max_power_kw),
            format!("{:.4}", r.concurrency_factor_pct),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
