//! End-to-end pipeline on the in-memory chain:
//! 1. Load a dataset
//! 2. Drive both contracts through add/delete
//! 3. Save, reload and summarize the records

use std::time::Duration;

use ethabi::Address;
use record_bench::chain::{ChainClient, MemoryChain, TransactionRequest};
use record_bench::contract::{
    ContractVariant, Contracts, Deployment, BASIC_RECORD_ABI, LIGHTWEIGHT_RECORD_ABI,
};
use record_bench::dataset::{self, Dataset};
use record_bench::experiment::{ExperimentDriver, NoProgress, RunState};
use record_bench::offchain::PlaceholderStore;
use record_bench::results::{report, Analyzer, Metric, ResultsStore};
use record_bench::Error;

const RECORDS_CSV: &str = "\
name,age,diagnosis,notes
alice,34,flu,recovering well after a week of rest
bob,51,fracture,cast removed
carol,29,migraine,
dave,62,hypertension,monitor blood pressure weekly and adjust dosage as needed
";

fn contracts() -> Contracts {
    Contracts::reference(Address::from_low_u64_be(0xb), Address::from_low_u64_be(0xc)).unwrap()
}

fn dataset() -> Dataset {
    Dataset::from_reader("records.csv", RECORDS_CSV.as_bytes()).unwrap()
}

#[test]
fn test_run_save_load_summarize() {
    let dir = tempfile::tempdir().unwrap();
    let chain = MemoryChain::new();
    let contracts = contracts();
    let dataset = dataset();

    let mut driver = ExperimentDriver::new(&chain, &contracts, &PlaceholderStore)
        .poll_interval(Duration::from_millis(1));
    let outcome = driver.run(&dataset, &mut NoProgress).unwrap();
    assert_eq!(outcome.records.len(), 2 * dataset.len());
    assert_eq!(driver.state(), RunState::Complete);
    assert_eq!(outcome.run.dataset(), "records.csv");
    assert!(!outcome.run.run_id().is_empty());
    assert!(outcome.run.ended_at() >= outcome.run.started_at());
    assert!(outcome.run.ended_at().is_some());

    let store = ResultsStore::new(dir.path().join("results"));
    store.save(&outcome.records).unwrap();
    assert_eq!(store.load().unwrap(), outcome.records);

    let analyzer = Analyzer::new(store);
    let table = analyzer.load().unwrap();
    assert!(Analyzer::coverage(&table).unwrap().is_complete());

    let summary = Analyzer::summarize(&table).unwrap();
    assert_eq!(summary.basic_count(), dataset.len());
    assert_eq!(summary.lightweight_count(), dataset.len());
    for row in summary.rows() {
        assert!(row.basic_mean >= 0.0);
        assert!(row.lightweight_mean >= 0.0);
    }

    // Every text section renders
    assert!(report::summary_table(&summary).contains("Add Gas Used"));
    assert!(report::bar_charts(&summary).contains("Gas Usage Comparison"));
    assert!(report::box_plots(&table).unwrap().contains("Delete Time (ms)"));
}

#[test]
fn test_lightweight_add_carries_reference() {
    let chain = MemoryChain::new();
    let contracts = contracts();
    let mut driver = ExperimentDriver::new(&chain, &contracts, &PlaceholderStore);
    driver.run(&dataset(), &mut NoProgress).unwrap();

    let sent = chain.sent();
    let basic_add = &sent[0];
    let light_add = &sent[2];
    assert_eq!(light_add.to, contracts.lightweight.address());
    // An extra string argument lengthens the calldata
    assert!(light_add.data.len() > basic_add.data.len());
    assert!(MemoryChain::gas_for(&light_add.data) > MemoryChain::gas_for(&basic_add.data));
}

#[test]
fn test_failed_run_saves_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let chain = MemoryChain::new().fail_on_send(3);
    let contracts = contracts();
    let mut driver = ExperimentDriver::new(&chain, &contracts, &PlaceholderStore);

    let result = driver.run(&dataset(), &mut NoProgress);
    assert!(result.is_err());
    assert_eq!(driver.state(), RunState::Idle);

    let store = ResultsStore::new(dir.path());
    assert!(store.load().is_none());
    assert!(!store.path().exists());
}

#[test]
fn test_receipt_timeout_aborts_run() {
    let chain = MemoryChain::new().withhold_receipts();
    let contracts = contracts();
    let mut driver = ExperimentDriver::new(&chain, &contracts, &PlaceholderStore)
        .receipt_timeout(Duration::from_millis(30))
        .poll_interval(Duration::from_millis(5));

    let started = std::time::Instant::now();
    let result = driver.run(&dataset(), &mut NoProgress);

    assert!(matches!(result, Err(Error::ReceiptTimeout { .. })));
    assert!(started.elapsed() >= Duration::from_millis(30));
    assert_eq!(chain.sent().len(), 1);
}

#[test]
fn test_wait_for_receipt_directly() {
    let chain = MemoryChain::new();
    let from = chain.accounts().unwrap()[0];
    let request = TransactionRequest::new(
        from,
        Address::from_low_u64_be(0xb),
        vec![0xde, 0xad, 0xbe, 0xef],
    );

    let receipt = chain
        .submit_and_confirm(&request, Duration::from_secs(1), Duration::from_millis(1))
        .unwrap();
    assert!(receipt.status);
    assert_eq!(receipt.gas_used, MemoryChain::gas_for(&request.data));
}

#[test]
fn test_deployment_from_files() {
    let dir = tempfile::tempdir().unwrap();
    let artifacts = dir.path().join("build");
    std::fs::create_dir_all(&artifacts).unwrap();
    std::fs::write(
        artifacts.join("BasicRecord.json"),
        format!(r#"{{"abi":{BASIC_RECORD_ABI}}}"#),
    )
    .unwrap();
    std::fs::write(
        artifacts.join("LightweightRecord.json"),
        format!(r#"{{"abi":{LIGHTWEIGHT_RECORD_ABI}}}"#),
    )
    .unwrap();

    let mut deployment = Deployment::default();
    deployment.insert(ContractVariant::Basic, Address::from_low_u64_be(0x10));
    deployment.insert(ContractVariant::Lightweight, Address::from_low_u64_be(0x20));
    let descriptor = dir.path().join("deployment_config.json");
    std::fs::write(&descriptor, serde_json::to_string(&deployment).unwrap()).unwrap();

    let contracts = Deployment::load(&descriptor).unwrap().contracts(&artifacts).unwrap();
    assert_eq!(contracts.basic.address(), Address::from_low_u64_be(0x10));
    assert_eq!(contracts.lightweight.variant(), ContractVariant::Lightweight);

    // Missing artifact is an error, not an empty interface
    std::fs::remove_file(artifacts.join("LightweightRecord.json")).unwrap();
    assert!(matches!(
        Deployment::load(&descriptor).unwrap().contracts(&artifacts),
        Err(Error::Deployment(_))
    ));
}

#[test]
fn test_upload_then_run() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("incoming.csv");
    std::fs::write(&source, RECORDS_CSV).unwrap();

    let stored = dataset::save_upload(&source, dir.path().join("datasets")).unwrap();
    let dataset = Dataset::load(&stored).unwrap();
    assert_eq!(dataset.name(), "incoming.csv");
    assert_eq!(dataset.len(), 4);

    let chain = MemoryChain::new();
    let contracts = contracts();
    let outcome = ExperimentDriver::new(&chain, &contracts, &PlaceholderStore)
        .run(&dataset, &mut NoProgress)
        .unwrap();

    let table = record_bench::results::ResultsTable::from_records(&outcome.records).unwrap();
    let summary = Analyzer::summarize(&table).unwrap();
    let add_gas = summary.row(Metric::AddGasUsed).unwrap();
    assert!(add_gas.lightweight_mean > 0.0);
    assert!(add_gas.basic_mean > 0.0);
}
