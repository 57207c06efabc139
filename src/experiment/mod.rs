//! Experiment loop and its records
//!
//! ## Schema Overview
//!
//! ```text
//! RunRecord (1) ──< MeasurementRecord (2 × rows)
//!                      one per (row, contract variant)
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use ethabi::Address;
//! use record_bench::chain::MemoryChain;
//! use record_bench::contract::Contracts;
//! use record_bench::dataset::Dataset;
//! use record_bench::experiment::{ExperimentDriver, NoProgress, RunState};
//! use record_bench::offchain::PlaceholderStore;
//!
//! # fn main() -> record_bench::Result<()> {
//! let contracts = Contracts::reference(Address::from_low_u64_be(1), Address::from_low_u64_be(2))?;
//! let chain = MemoryChain::new();
//! let dataset = Dataset::from_reader("demo.csv", "name,age\nalice,30\n".as_bytes())?;
//!
//! let mut driver = ExperimentDriver::new(&chain, &contracts, &PlaceholderStore);
//! let outcome = driver.run(&dataset, &mut NoProgress)?;
//!
//! assert_eq!(outcome.records.len(), 2);
//! assert_eq!(driver.state(), RunState::Complete);
//! # Ok(())
//! # }
//! ```

mod driver;
mod measurement;
mod progress;
mod run_record;

pub use driver::{
    ExperimentDriver, ExperimentOutcome, DEFAULT_POLL_INTERVAL, DEFAULT_RECEIPT_TIMEOUT,
};
pub use measurement::{MeasurementRecord, MeasurementRecordBuilder, OperationCost};
pub use progress::{LogProgress, NoProgress, ProgressSink};
pub use run_record::{RunRecord, RunState};
