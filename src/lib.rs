//! # record-bench: gas and latency benchmark for record contracts
//!
//! Drives two pre-deployed contracts with the rows of a CSV dataset and
//! compares what each costs:
//!
//! - **`BasicContract`** stores every field of a record on-chain.
//! - **`LightweightContract`** stores a hash and an off-chain reference.
//!
//! For every row both contracts receive `addRecord` then `deleteRecord`;
//! gas comes from the transaction receipt and latency is wall-clock time
//! from submission until the receipt arrives.
//!
//! ## Pipeline
//!
//! ```text
//! Dataset ─> ExperimentDriver ─> ResultsStore (CSV) ─> Analyzer ─> report
//!               │
//!               ├─ ChainClient   (JSON-RPC or in-memory)
//!               ├─ ContractHandle (ABI encoding)
//!               └─ OffChainStore  (placeholder or IPFS)
//! ```
//!
//! ## Example
//!
//! ```rust,no_run
//! use record_bench::chain::HttpChainClient;
//! use record_bench::config::BenchConfig;
//! use record_bench::contract::Deployment;
//! use record_bench::dataset::Dataset;
//! use record_bench::experiment::{ExperimentDriver, LogProgress};
//! use record_bench::offchain::PlaceholderStore;
//! use record_bench::results::ResultsStore;
//!
//! let config = BenchConfig::default();
//! let chain = HttpChainClient::new(&config.rpc_url, config.request_timeout())?;
//! let contracts = Deployment::load(&config.deployment_path)?.contracts(&config.artifacts_dir)?;
//! let dataset = Dataset::load("datasets/records.csv")?;
//!
//! let mut driver = ExperimentDriver::new(&chain, &contracts, &PlaceholderStore)
//!     .receipt_timeout(config.receipt_timeout());
//! let outcome = driver.run(&dataset, &mut LogProgress)?;
//! let _ = ResultsStore::new(&config.results_dir).save(&outcome.records);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod chain;
pub mod config;
pub mod contract;
pub mod dataset;
pub mod error;
pub mod experiment;
pub mod offchain;
pub mod results;
pub mod theory;

pub use error::{Error, Result};
