//! Benchmark configuration
//!
//! Every field has a default matching a local dev chain (Ganache/Hardhat on
//! port 8545, Truffle build layout one directory up). A JSON file can
//! override any subset of fields; CLI flags override the file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Default JSON-RPC endpoint
pub const DEFAULT_RPC_URL: &str = "http://127.0.0.1:8545";

/// Default IPFS HTTP API root
pub const DEFAULT_IPFS_API_URL: &str = "http://localhost:5001/api/v0";

/// Source of the off-chain reference passed to the lightweight contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OffChainMode {
    /// Fixed placeholder identifier, nothing is uploaded.
    #[default]
    Placeholder,
    /// Upload each row to an IPFS node and pin it.
    Ipfs,
}

/// Configuration for a benchmark session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchConfig {
    /// JSON-RPC endpoint of the chain node
    pub rpc_url: String,
    /// JSON file mapping contract names to addresses
    pub deployment_path: PathBuf,
    /// Directory holding `<ContractName>.json` build artifacts
    pub artifacts_dir: PathBuf,
    /// Where uploaded datasets are copied
    pub datasets_dir: PathBuf,
    /// Where `output.csv` is written
    pub results_dir: PathBuf,
    /// Maximum wait for a transaction receipt
    pub receipt_timeout_ms: u64,
    /// Delay between receipt polls
    pub poll_interval_ms: u64,
    /// Timeout of a single HTTP request
    pub request_timeout_ms: u64,
    /// Off-chain reference source
    pub offchain: OffChainMode,
    /// IPFS API root, used when `offchain` is `ipfs`
    pub ipfs_api_url: String,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            rpc_url: DEFAULT_RPC_URL.to_string(),
            deployment_path: PathBuf::from("../deployment_config.json"),
            artifacts_dir: PathBuf::from("../build/contracts"),
            datasets_dir: PathBuf::from("datasets"),
            results_dir: PathBuf::from("results"),
            receipt_timeout_ms: 60_000,
            poll_interval_ms: 250,
            request_timeout_ms: 30_000,
            offchain: OffChainMode::Placeholder,
            ipfs_api_url: DEFAULT_IPFS_API_URL.to_string(),
        }
    }
}

impl BenchConfig {
    /// Load configuration from a JSON file. Missing fields take defaults.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read, is not valid JSON, or fails
    /// [`validate`](Self::validate).
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would make the run hang or spin.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for zero timeouts or poll interval, or
    /// an empty RPC URL.
    pub fn validate(&self) -> Result<()> {
        if self.rpc_url.trim().is_empty() {
            return Err(Error::InvalidInput("rpc_url must not be empty".to_string()));
        }
        if self.receipt_timeout_ms == 0 {
            return Err(Error::InvalidInput(
                "receipt_timeout_ms must be positive".to_string(),
            ));
        }
        if self.poll_interval_ms == 0 {
            return Err(Error::InvalidInput(
                "poll_interval_ms must be positive".to_string(),
            ));
        }
        if self.request_timeout_ms == 0 {
            return Err(Error::InvalidInput(
                "request_timeout_ms must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Receipt wait as a [`Duration`].
    #[must_use]
    pub const fn receipt_timeout(&self) -> Duration {
        Duration::from_millis(self.receipt_timeout_ms)
    }

    /// Receipt poll interval as a [`Duration`].
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Per-request HTTP timeout as a [`Duration`].
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Fixed location of the results file.
    #[must_use]
    pub fn results_path(&self) -> PathBuf {
        self.results_dir.join(crate::results::RESULTS_FILE_NAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = BenchConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.rpc_url, DEFAULT_RPC_URL);
        assert_eq!(config.offchain, OffChainMode::Placeholder);
        assert_eq!(config.results_path(), PathBuf::from("results/output.csv"));
    }

    #[test]
    fn test_partial_json_takes_defaults() {
        let config: BenchConfig =
            serde_json::from_str(r#"{"rpc_url": "http://node:8545", "offchain": "ipfs"}"#)
                .unwrap();
        assert_eq!(config.rpc_url, "http://node:8545");
        assert_eq!(config.offchain, OffChainMode::Ipfs);
        assert_eq!(config.poll_interval_ms, 250);
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let config = BenchConfig {
            receipt_timeout_ms: 0,
            ..BenchConfig::default()
        };
        assert!(matches!(config.validate(), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bench.json");
        std::fs::write(&path, r#"{"receipt_timeout_ms": 5000}"#).unwrap();

        let config = BenchConfig::load(&path).unwrap();
        assert_eq!(config.receipt_timeout(), Duration::from_secs(5));
    }
}
