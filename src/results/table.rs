//! Columnar view over measurement records
//!
//! Results are loaded into a single Arrow [`RecordBatch`] so that per-variant
//! partitions are plain filter kernels and metric columns can be scanned
//! without touching the rest of the row.

use std::sync::Arc;

use arrow::array::{Array, ArrayRef, BooleanArray, Float64Array, StringArray, UInt64Array};
use arrow::compute;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;

use crate::contract::ContractVariant;
use crate::experiment::{MeasurementRecord, OperationCost};
use crate::{Error, Result};

/// `contract_name` column
pub const CONTRACT_NAME: &str = "contract_name";
/// `index` column
pub const INDEX: &str = "index";
/// `add_gas_used` column
pub const ADD_GAS_USED: &str = "add_gas_used";
/// `add_time` column (milliseconds)
pub const ADD_TIME: &str = "add_time";
/// `delete_gas_used` column
pub const DELETE_GAS_USED: &str = "delete_gas_used";
/// `delete_time` column (milliseconds)
pub const DELETE_TIME: &str = "delete_time";

/// The four compared quantities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    /// Gas of `addRecord`
    AddGasUsed,
    /// Gas of `deleteRecord`
    DeleteGasUsed,
    /// Latency of `addRecord`
    AddTime,
    /// Latency of `deleteRecord`
    DeleteTime,
}

impl Metric {
    /// Report order.
    pub const ALL: [Self; 4] = [
        Self::AddGasUsed,
        Self::DeleteGasUsed,
        Self::AddTime,
        Self::DeleteTime,
    ];

    /// Backing column name.
    #[must_use]
    pub const fn column(self) -> &'static str {
        match self {
            Self::AddGasUsed => ADD_GAS_USED,
            Self::DeleteGasUsed => DELETE_GAS_USED,
            Self::AddTime => ADD_TIME,
            Self::DeleteTime => DELETE_TIME,
        }
    }

    /// Human-readable label used in reports.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::AddGasUsed => "Add Gas Used",
            Self::DeleteGasUsed => "Delete Gas Used",
            Self::AddTime => "Add Time (ms)",
            Self::DeleteTime => "Delete Time (ms)",
        }
    }

    /// True for gas metrics, false for latency.
    #[must_use]
    pub const fn is_gas(self) -> bool {
        matches!(self, Self::AddGasUsed | Self::DeleteGasUsed)
    }
}

fn schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new(CONTRACT_NAME, DataType::Utf8, false),
        Field::new(INDEX, DataType::UInt64, false),
        Field::new(ADD_GAS_USED, DataType::UInt64, false),
        Field::new(ADD_TIME, DataType::Float64, false),
        Field::new(DELETE_GAS_USED, DataType::UInt64, false),
        Field::new(DELETE_TIME, DataType::Float64, false),
    ]))
}

/// Measurement records as one columnar batch.
#[derive(Debug, Clone)]
pub struct ResultsTable {
    batch: RecordBatch,
}

impl ResultsTable {
    /// Build a table from records.
    ///
    /// # Errors
    ///
    /// Returns error if the batch cannot be assembled.
    pub fn from_records(records: &[MeasurementRecord]) -> Result<Self> {
        let columns: Vec<ArrayRef> = vec![
            Arc::new(StringArray::from_iter_values(
                records.iter().map(MeasurementRecord::contract_name),
            )),
            Arc::new(UInt64Array::from_iter_values(
                records.iter().map(|r| r.index() as u64),
            )),
            Arc::new(UInt64Array::from_iter_values(
                records.iter().map(MeasurementRecord::add_gas_used),
            )),
            Arc::new(Float64Array::from_iter_values(
                records.iter().map(MeasurementRecord::add_time_ms),
            )),
            Arc::new(UInt64Array::from_iter_values(
                records.iter().map(MeasurementRecord::delete_gas_used),
            )),
            Arc::new(Float64Array::from_iter_values(
                records.iter().map(MeasurementRecord::delete_time_ms),
            )),
        ];

        let batch = RecordBatch::try_new(schema(), columns)
            .map_err(|e| Error::StorageError(format!("Failed to build results batch: {e}")))?;
        Ok(Self { batch })
    }

    /// Underlying batch.
    #[must_use]
    pub const fn batch(&self) -> &RecordBatch {
        &self.batch
    }

    /// Number of records.
    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }

    /// True when there are no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.batch.num_rows() == 0
    }

    /// Rows whose `contract_name` matches `variant`.
    ///
    /// # Errors
    ///
    /// Returns error if the name column has an unexpected type or the filter
    /// kernel fails.
    pub fn partition(&self, variant: ContractVariant) -> Result<Self> {
        let names = string_column(&self.batch, CONTRACT_NAME)?;
        let wanted = variant.contract_name();
        let mask: Vec<bool> = (0..names.len())
            .map(|i| !names.is_null(i) && names.value(i) == wanted)
            .collect();

        let batch = compute::filter_record_batch(&self.batch, &BooleanArray::from(mask))
            .map_err(|e| Error::StorageError(format!("Failed to partition results: {e}")))?;
        Ok(Self { batch })
    }

    /// All values of a metric as `f64`, in row order.
    ///
    /// # Errors
    ///
    /// Returns error if the column is missing or not numeric.
    #[allow(clippy::cast_precision_loss)]
    pub fn metric_values(&self, metric: Metric) -> Result<Vec<f64>> {
        let column = self
            .batch
            .column_by_name(metric.column())
            .ok_or_else(|| Error::InvalidInput(format!("Column not found: {}", metric.column())))?;

        match column.data_type() {
            DataType::UInt64 => {
                let array = column
                    .as_any()
                    .downcast_ref::<UInt64Array>()
                    .ok_or_else(|| Error::Other("Failed to downcast to UInt64Array".to_string()))?;
                Ok((0..array.len())
                    .filter(|&i| !array.is_null(i))
                    .map(|i| array.value(i) as f64)
                    .collect())
            }
            DataType::Float64 => {
                let array = column
                    .as_any()
                    .downcast_ref::<Float64Array>()
                    .ok_or_else(|| {
                        Error::Other("Failed to downcast to Float64Array".to_string())
                    })?;
                Ok((0..array.len())
                    .filter(|&i| !array.is_null(i))
                    .map(|i| array.value(i))
                    .collect())
            }
            dt => Err(Error::InvalidInput(format!(
                "Metric not supported for data type: {dt:?}"
            ))),
        }
    }

    /// Arithmetic mean of a metric; `None` on an empty table.
    ///
    /// # Errors
    ///
    /// See [`metric_values`](Self::metric_values).
    #[allow(clippy::cast_precision_loss)]
    pub fn mean(&self, metric: Metric) -> Result<Option<f64>> {
        let values = self.metric_values(metric)?;
        if values.is_empty() {
            return Ok(None);
        }
        Ok(Some(values.iter().sum::<f64>() / values.len() as f64))
    }

    /// Convert back to records, for raw display and export.
    ///
    /// # Errors
    ///
    /// Returns error if a column is missing or has an unexpected type.
    #[allow(clippy::cast_possible_truncation)]
    pub fn to_records(&self) -> Result<Vec<MeasurementRecord>> {
        let names = string_column(&self.batch, CONTRACT_NAME)?;
        let index = u64_column(&self.batch, INDEX)?;
        let add_gas = u64_column(&self.batch, ADD_GAS_USED)?;
        let add_time = f64_column(&self.batch, ADD_TIME)?;
        let delete_gas = u64_column(&self.batch, DELETE_GAS_USED)?;
        let delete_time = f64_column(&self.batch, DELETE_TIME)?;

        Ok((0..self.batch.num_rows())
            .map(|i| {
                MeasurementRecord::new(
                    names.value(i),
                    index.value(i) as usize,
                    OperationCost::new(add_gas.value(i), add_time.value(i)),
                    OperationCost::new(delete_gas.value(i), delete_time.value(i)),
                )
            })
            .collect())
    }
}

fn string_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a StringArray> {
    batch
        .column_by_name(name)
        .and_then(|c| c.as_any().downcast_ref::<StringArray>())
        .ok_or_else(|| Error::InvalidInput(format!("Expected Utf8 column: {name}")))
}

fn u64_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a UInt64Array> {
    batch
        .column_by_name(name)
        .and_then(|c| c.as_any().downcast_ref::<UInt64Array>())
        .ok_or_else(|| Error::InvalidInput(format!("Expected UInt64 column: {name}")))
}

fn f64_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a Float64Array> {
    batch
        .column_by_name(name)
        .and_then(|c| c.as_any().downcast_ref::<Float64Array>())
        .ok_or_else(|| Error::InvalidInput(format!("Expected Float64 column: {name}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records() -> Vec<MeasurementRecord> {
        vec![
            MeasurementRecord::builder("BasicContract", 0).add(100, 10.0).delete(40, 4.0).build(),
            MeasurementRecord::builder("LightweightContract", 0)
                .add(60, 8.0)
                .delete(20, 2.0)
                .build(),
            MeasurementRecord::builder("BasicContract", 1).add(300, 30.0).delete(60, 6.0).build(),
        ]
    }

    #[test]
    fn test_from_records_shape() {
        let table = ResultsTable::from_records(&records()).unwrap();
        assert_eq!(table.num_rows(), 3);
        assert_eq!(table.batch().num_columns(), 6);
        assert!(!table.is_empty());
    }

    #[test]
    fn test_empty_table() {
        let table = ResultsTable::from_records(&[]).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.mean(Metric::AddGasUsed).unwrap(), None);
    }

    #[test]
    fn test_partition_and_mean() {
        let table = ResultsTable::from_records(&records()).unwrap();
        let basic = table.partition(ContractVariant::Basic).unwrap();
        assert_eq!(basic.num_rows(), 2);
        assert_eq!(basic.mean(Metric::AddGasUsed).unwrap(), Some(200.0));
        assert_eq!(basic.mean(Metric::DeleteTime).unwrap(), Some(5.0));

        let light = table.partition(ContractVariant::Lightweight).unwrap();
        assert_eq!(light.metric_values(Metric::AddTime).unwrap(), vec![8.0]);
    }

    #[test]
    fn test_to_records_roundtrip() {
        let table = ResultsTable::from_records(&records()).unwrap();
        assert_eq!(table.to_records().unwrap(), records());
    }

    #[test]
    fn test_metric_labels() {
        assert_eq!(Metric::AddTime.column(), "add_time");
        assert_eq!(Metric::DeleteGasUsed.label(), "Delete Gas Used");
        assert!(Metric::AddGasUsed.is_gas());
        assert!(!Metric::DeleteTime.is_gas());
    }
}
