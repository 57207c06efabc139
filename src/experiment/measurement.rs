//! Measurement Record - cost of one add/delete pair on one contract

use serde::{Deserialize, Serialize};

/// Gas and wall time of a single confirmed transaction.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct OperationCost {
    /// Gas reported by the receipt
    pub gas_used: u64,
    /// Submission-to-receipt time in milliseconds
    pub time_ms: f64,
}

impl OperationCost {
    /// Create a cost sample.
    #[must_use]
    pub const fn new(gas_used: u64, time_ms: f64) -> Self {
        Self { gas_used, time_ms }
    }
}

/// Measurement Record represents one dataset row written to and removed
/// from one contract.
///
/// Serialized as a flat CSV row:
/// `contract_name,index,add_gas_used,add_time,delete_gas_used,delete_time`.
/// Older files with `add_time_ms`/`delete_time_ms` headers load too.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MeasurementRecord {
    contract_name: String,
    index: usize,
    add_gas_used: u64,
    #[serde(rename = "add_time", alias = "add_time_ms")]
    add_time_ms: f64,
    delete_gas_used: u64,
    #[serde(rename = "delete_time", alias = "delete_time_ms")]
    delete_time_ms: f64,
}

impl MeasurementRecord {
    /// Create a measurement record.
    ///
    /// # Arguments
    ///
    /// * `contract_name` - Variant label (e.g. `BasicContract`)
    /// * `index` - Dataset row index
    /// * `add` - Cost of `addRecord`
    /// * `delete` - Cost of `deleteRecord`
    #[must_use]
    pub fn new(
        contract_name: impl Into<String>,
        index: usize,
        add: OperationCost,
        delete: OperationCost,
    ) -> Self {
        Self {
            contract_name: contract_name.into(),
            index,
            add_gas_used: add.gas_used,
            add_time_ms: add.time_ms,
            delete_gas_used: delete.gas_used,
            delete_time_ms: delete.time_ms,
        }
    }

    /// Create a builder, mostly useful for fixtures.
    #[must_use]
    pub fn builder(contract_name: impl Into<String>, index: usize) -> MeasurementRecordBuilder {
        MeasurementRecordBuilder::new(contract_name, index)
    }

    /// Variant label.
    #[must_use]
    pub fn contract_name(&self) -> &str {
        &self.contract_name
    }

    /// Dataset row index.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Gas used by `addRecord`.
    #[must_use]
    pub const fn add_gas_used(&self) -> u64 {
        self.add_gas_used
    }

    /// Milliseconds until `addRecord` was confirmed.
    #[must_use]
    pub const fn add_time_ms(&self) -> f64 {
        self.add_time_ms
    }

    /// Gas used by `deleteRecord`.
    #[must_use]
    pub const fn delete_gas_used(&self) -> u64 {
        self.delete_gas_used
    }

    /// Milliseconds until `deleteRecord` was confirmed.
    #[must_use]
    pub const fn delete_time_ms(&self) -> f64 {
        self.delete_time_ms
    }
}

/// Builder for `MeasurementRecord`.
#[derive(Debug)]
pub struct MeasurementRecordBuilder {
    contract_name: String,
    index: usize,
    add: OperationCost,
    delete: OperationCost,
}

impl MeasurementRecordBuilder {
    /// Create a new builder with zero costs.
    #[must_use]
    pub fn new(contract_name: impl Into<String>, index: usize) -> Self {
        Self {
            contract_name: contract_name.into(),
            index,
            add: OperationCost::default(),
            delete: OperationCost::default(),
        }
    }

    /// Set the `addRecord` cost.
    #[must_use]
    pub const fn add(mut self, gas_used: u64, time_ms: f64) -> Self {
        self.add = OperationCost::new(gas_used, time_ms);
        self
    }

    /// Set the `deleteRecord` cost.
    #[must_use]
    pub const fn delete(mut self, gas_used: u64, time_ms: f64) -> Self {
        self.delete = OperationCost::new(gas_used, time_ms);
        self
    }

    /// Build the `MeasurementRecord`.
    #[must_use]
    pub fn build(self) -> MeasurementRecord {
        MeasurementRecord::new(self.contract_name, self.index, self.add, self.delete)
    }
}
