//! Experiment driver - the measured add/delete loop

use std::time::{Duration, Instant};

use chrono::Utc;
use ethabi::Address;
use tracing::{info, instrument, warn};

use super::{MeasurementRecord, OperationCost, ProgressSink, RunRecord, RunState};
use crate::chain::{ChainClient, TransactionRequest};
use crate::contract::{ContractHandle, Contracts};
use crate::dataset::{Dataset, DatasetRow};
use crate::offchain::OffChainStore;
use crate::{Error, Result};

/// Default upper bound on waiting for one receipt
pub const DEFAULT_RECEIPT_TIMEOUT: Duration = Duration::from_secs(60);

/// Default delay between receipt polls
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Result of a completed run.
#[derive(Debug, Clone)]
pub struct ExperimentOutcome {
    /// Lifecycle metadata
    pub run: RunRecord,
    /// One record per (row, contract), in submission order
    pub records: Vec<MeasurementRecord>,
}

/// Drives every dataset row through both contracts, one transaction at a
/// time.
///
/// For row `i` and each contract (basic first): submit `addRecord(i, ..)`,
/// wait for its receipt, then `deleteRecord(i)` and wait again. Any chain
/// failure aborts the run; the partial records are dropped.
pub struct ExperimentDriver<'a> {
    chain: &'a dyn ChainClient,
    contracts: &'a Contracts,
    offchain: &'a dyn OffChainStore,
    receipt_timeout: Duration,
    poll_interval: Duration,
    state: RunState,
}

impl<'a> ExperimentDriver<'a> {
    /// Create an idle driver with default timeouts.
    #[must_use]
    pub fn new(
        chain: &'a dyn ChainClient,
        contracts: &'a Contracts,
        offchain: &'a dyn OffChainStore,
    ) -> Self {
        Self {
            chain,
            contracts,
            offchain,
            receipt_timeout: DEFAULT_RECEIPT_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            state: RunState::Idle,
        }
    }

    /// Set the per-transaction receipt timeout.
    #[must_use]
    pub const fn receipt_timeout(mut self, timeout: Duration) -> Self {
        self.receipt_timeout = timeout;
        self
    }

    /// Set the receipt poll interval.
    #[must_use]
    pub const fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Current display state.
    #[must_use]
    pub const fn state(&self) -> RunState {
        self.state
    }

    /// Return to the idle view. Does not touch saved results.
    pub fn reset(&mut self) {
        self.state = RunState::Idle;
    }

    /// Measure every row of `dataset` on both contracts.
    ///
    /// # Errors
    ///
    /// Returns the first chain, ABI or off-chain store error. The driver is
    /// back in [`RunState::Idle`] afterwards and no records are returned.
    #[instrument(skip_all, fields(dataset = dataset.name(), rows = dataset.len()))]
    pub fn run(
        &mut self,
        dataset: &Dataset,
        progress: &mut dyn ProgressSink,
    ) -> Result<ExperimentOutcome> {
        let run_id = format!("run-{}", Utc::now().format("%Y%m%dT%H%M%S%.3f"));
        let mut run = RunRecord::new(run_id, dataset.name(), dataset.len());

        run.start();
        self.state = RunState::Running;

        match self.measure_all(dataset, progress) {
            Ok(records) => {
                run.complete();
                self.state = RunState::Complete;
                info!(records = records.len(), "run complete");
                Ok(ExperimentOutcome { run, records })
            }
            Err(e) => {
                self.state = RunState::Idle;
                warn!(error = %e, "run aborted");
                Err(e)
            }
        }
    }

    fn measure_all(
        &self,
        dataset: &Dataset,
        progress: &mut dyn ProgressSink,
    ) -> Result<Vec<MeasurementRecord>> {
        let from = self
            .chain
            .accounts()?
            .first()
            .copied()
            .ok_or(Error::NoAccounts)?;

        let row_count = dataset.len();
        let mut records = Vec::with_capacity(row_count * 2);

        for row in dataset.rows() {
            #[allow(clippy::cast_precision_loss)]
            let fraction = (row.index() + 1) as f64 / row_count as f64;
            progress.on_row(dataset, row, fraction);

            for contract in self.contracts.in_order() {
                let record = self.measure_row(dataset, row, contract, from)?;
                progress.on_measurement(&record);
                records.push(record);
            }
        }

        Ok(records)
    }

    fn measure_row(
        &self,
        dataset: &Dataset,
        row: &DatasetRow,
        contract: &ContractHandle,
        from: Address,
    ) -> Result<MeasurementRecord> {
        let offchain_ref = if contract.variant().takes_offchain_ref() {
            let content = dataset.row_csv(row)?;
            Some(self.offchain.put(&row.index().to_string(), &content)?)
        } else {
            None
        };

        let add_request =
            contract.add_record_request(from, row.index(), row.values(), offchain_ref.as_deref())?;
        let add = self.confirm_timed(&add_request)?;

        let delete_request = contract.delete_record_request(from, row.index())?;
        let delete = self.confirm_timed(&delete_request)?;

        Ok(MeasurementRecord::new(
            contract.variant().contract_name(),
            row.index(),
            add,
            delete,
        ))
    }

    fn confirm_timed(&self, request: &TransactionRequest) -> Result<OperationCost> {
        let start = Instant::now();
        let receipt = self
            .chain
            .submit_and_confirm(request, self.receipt_timeout, self.poll_interval)?;
        let time_ms = start.elapsed().as_secs_f64() * 1000.0;
        Ok(OperationCost::new(receipt.gas_used, time_ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::MemoryChain;
    use crate::experiment::NoProgress;
    use crate::offchain::PlaceholderStore;

    fn contracts() -> Contracts {
        Contracts::reference(Address::from_low_u64_be(0xb), Address::from_low_u64_be(0xc)).unwrap()
    }

    fn dataset() -> Dataset {
        Dataset::from_reader("t.csv", "a,b\n1,x\n2,y\n3,z\n".as_bytes()).unwrap()
    }

    #[test]
    fn test_run_produces_two_records_per_row() {
        let chain = MemoryChain::new();
        let contracts = contracts();
        let mut driver = ExperimentDriver::new(&chain, &contracts, &PlaceholderStore);

        let outcome = driver.run(&dataset(), &mut NoProgress).unwrap();

        assert_eq!(outcome.records.len(), 6);
        assert_eq!(driver.state(), RunState::Complete);
        assert_eq!(outcome.run.state(), RunState::Complete);
        assert_eq!(outcome.run.row_count(), 3);
        // 3 rows x 2 contracts x (add + delete)
        assert_eq!(chain.sent().len(), 12);
    }

    #[test]
    fn test_order_is_row_then_variant_add_before_delete() {
        let chain = MemoryChain::new();
        let contracts = contracts();
        let mut driver = ExperimentDriver::new(&chain, &contracts, &PlaceholderStore);
        let outcome = driver.run(&dataset(), &mut NoProgress).unwrap();

        let names: Vec<_> = outcome
            .records
            .iter()
            .map(|r| (r.index(), r.contract_name().to_string()))
            .collect();
        assert_eq!(names[0], (0, "BasicContract".to_string()));
        assert_eq!(names[1], (0, "LightweightContract".to_string()));
        assert_eq!(names[2], (1, "BasicContract".to_string()));

        let sent = chain.sent();
        let add = contracts.basic.selector("addRecord", 2).unwrap();
        let delete = contracts.basic.selector("deleteRecord", 1).unwrap();
        assert_eq!(sent[0].selector(), Some(add));
        assert_eq!(sent[0].to, contracts.basic.address());
        assert_eq!(sent[1].selector(), Some(delete));
        assert_eq!(sent[2].to, contracts.lightweight.address());
    }

    #[test]
    fn test_failure_aborts_and_resets_state() {
        let chain = MemoryChain::new().fail_on_send(5);
        let contracts = contracts();
        let mut driver = ExperimentDriver::new(&chain, &contracts, &PlaceholderStore);

        let result = driver.run(&dataset(), &mut NoProgress);

        assert!(matches!(result, Err(Error::Rpc { .. })));
        assert_eq!(driver.state(), RunState::Idle);
        assert_eq!(chain.sent().len(), 5);
    }

    #[test]
    fn test_no_accounts() {
        let chain = MemoryChain::with_accounts(Vec::new());
        let contracts = contracts();
        let mut driver = ExperimentDriver::new(&chain, &contracts, &PlaceholderStore);

        assert!(matches!(
            driver.run(&dataset(), &mut NoProgress),
            Err(Error::NoAccounts)
        ));
    }

    #[test]
    fn test_reset_returns_to_idle() {
        let chain = MemoryChain::new();
        let contracts = contracts();
        let mut driver = ExperimentDriver::new(&chain, &contracts, &PlaceholderStore);
        driver.run(&dataset(), &mut NoProgress).unwrap();

        driver.reset();
        assert_eq!(driver.state(), RunState::Idle);
    }

    #[test]
    fn test_revert_aborts_run() {
        let contracts = contracts();
        let selector = contracts.lightweight.selector("addRecord", 3).unwrap();
        let chain = MemoryChain::new().revert_selector(selector);
        let mut driver = ExperimentDriver::new(&chain, &contracts, &PlaceholderStore);

        assert!(matches!(
            driver.run(&dataset(), &mut NoProgress),
            Err(Error::Reverted { .. })
        ));
        // basic add + delete, then the reverted lightweight add
        assert_eq!(chain.sent().len(), 3);
        assert_eq!(driver.state(), RunState::Idle);
    }
}
