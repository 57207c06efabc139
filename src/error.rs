//! Error types for record-bench
//!
//! Chain errors abort a run; file errors are caught at the call site and
//! reported, see [`crate::results::ResultsStore`].

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// record-bench error types
#[derive(Error, Debug)]
pub enum Error {
    /// JSON-RPC endpoint returned an error object
    #[error("RPC error {code} from {method}: {message}")]
    Rpc {
        /// Method that failed
        method: String,
        /// JSON-RPC error code
        code: i64,
        /// Error message reported by the node
        message: String,
    },

    /// Node answered with something that is not a valid response
    #[error("Malformed RPC response for {method}: {detail}")]
    MalformedResponse {
        /// Method that was called
        method: String,
        /// What was wrong with the payload
        detail: String,
    },

    /// Transaction was mined but reverted (receipt status 0)
    #[error("Transaction {tx_hash} reverted (gas used: {gas_used})")]
    Reverted {
        /// Hash of the reverted transaction
        tx_hash: String,
        /// Gas charged for the failed execution
        gas_used: u64,
    },

    /// No receipt within the caller-supplied timeout
    #[error("No receipt for {tx_hash} after {waited_ms} ms\nIs the node mining?")]
    ReceiptTimeout {
        /// Hash of the pending transaction
        tx_hash: String,
        /// How long we waited
        waited_ms: u128,
    },

    /// The node exposes no unlocked account to send from
    #[error("Node returned no accounts; unlock an account or use a dev chain")]
    NoAccounts,

    /// Contract interface error (unknown function, bad arguments)
    #[error("ABI error: {0}")]
    Abi(String),

    /// Deployment descriptor or artifact problem
    #[error("Deployment error: {0}")]
    Deployment(String),

    /// Input dataset problem
    #[error("Dataset error: {0}")]
    Dataset(String),

    /// Off-chain content store failure
    #[error("Off-chain store error: {0}")]
    OffChain(String),

    /// Results storage error
    #[error("Storage error: {0}")]
    StorageError(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Arrow error
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<ethabi::Error> for Error {
    fn from(err: ethabi::Error) -> Self {
        Self::Abi(err.to_string())
    }
}
