//! Progress reporting hooks for the experiment loop

use tracing::info;

use super::MeasurementRecord;
use crate::dataset::{Dataset, DatasetRow};

/// Receives progress while a run executes. Presentation only: a sink cannot
/// affect the measurements.
pub trait ProgressSink {
    /// A row is about to be submitted; `fraction` is `(index + 1) / rows`.
    fn on_row(&mut self, _dataset: &Dataset, _row: &DatasetRow, _fraction: f64) {}

    /// A row finished on one contract.
    fn on_measurement(&mut self, _record: &MeasurementRecord) {}
}

/// Discards all progress.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {}

/// Emits progress as `tracing` events.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogProgress;

impl ProgressSink for LogProgress {
    fn on_row(&mut self, _dataset: &Dataset, row: &DatasetRow, fraction: f64) {
        info!(index = row.index(), fraction, "processing row");
    }

    fn on_measurement(&mut self, record: &MeasurementRecord) {
        info!(
            contract = record.contract_name(),
            index = record.index(),
            add_gas = record.add_gas_used(),
            add_ms = record.add_time_ms(),
            delete_gas = record.delete_gas_used(),
            delete_ms = record.delete_time_ms(),
            "measured"
        );
    }
}
