//! Chain client adapter
//!
//! The experiment only needs three things from a node: an account to send
//! from, a way to submit a transaction, and a way to read the receipt back.
//! Everything is blocking; waiting for confirmation is an explicit poll loop
//! bounded by a caller-supplied timeout.
//!
//! # Example
//!
//! ```rust
//! use std::time::Duration;
//! use record_bench::chain::{ChainClient, MemoryChain, TransactionRequest};
//!
//! # fn main() -> record_bench::Result<()> {
//! let chain = MemoryChain::new();
//! let from = chain.accounts()?[0];
//! let request = TransactionRequest::new(from, from, vec![0xde, 0xad, 0xbe, 0xef]);
//!
//! let receipt = chain.submit_and_confirm(
//!     &request,
//!     Duration::from_secs(1),
//!     Duration::from_millis(10),
//! )?;
//! assert!(receipt.gas_used > 21_000);
//! # Ok(())
//! # }
//! ```

mod http;
mod memory;

pub use http::HttpChainClient;
pub use memory::MemoryChain;

use std::fmt;
use std::time::{Duration, Instant};

use ethabi::Address;
use tracing::debug;

use crate::{Error, Result};

/// Hash of a submitted transaction, kept in its `0x`-prefixed hex form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TxHash(String);

impl TxHash {
    /// Wrap a hex hash as returned by the node.
    #[must_use]
    pub fn new(hash: impl Into<String>) -> Self {
        Self(hash.into())
    }

    /// Hex representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A contract call to be sent from an unlocked node account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionRequest {
    /// Sender account
    pub from: Address,
    /// Contract address
    pub to: Address,
    /// ABI-encoded calldata
    pub data: Vec<u8>,
}

impl TransactionRequest {
    /// Build a call request.
    #[must_use]
    pub const fn new(from: Address, to: Address, data: Vec<u8>) -> Self {
        Self { from, to, data }
    }

    /// Four-byte function selector, if the calldata carries one.
    #[must_use]
    pub fn selector(&self) -> Option<[u8; 4]> {
        self.data.get(..4).and_then(|s| s.try_into().ok())
    }
}

/// Subset of a transaction receipt the benchmark reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    /// Hash of the confirmed transaction
    pub tx_hash: TxHash,
    /// Gas charged for execution
    pub gas_used: u64,
    /// `false` when execution reverted
    pub status: bool,
}

/// Blocking access to a chain node.
pub trait ChainClient {
    /// Accounts the node can sign for.
    ///
    /// # Errors
    ///
    /// Returns error if the node cannot be reached or answers malformed data.
    fn accounts(&self) -> Result<Vec<Address>>;

    /// Submit a transaction and return its hash without waiting for it.
    ///
    /// # Errors
    ///
    /// Returns error if the node rejects the transaction.
    fn send_transaction(&self, request: &TransactionRequest) -> Result<TxHash>;

    /// Fetch a receipt; `None` while the transaction is pending.
    ///
    /// # Errors
    ///
    /// Returns error if the node cannot be reached or answers malformed data.
    fn transaction_receipt(&self, tx_hash: &TxHash) -> Result<Option<Receipt>>;

    /// Poll for a receipt until it appears or `timeout` elapses.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ReceiptTimeout`] when no receipt shows up in time, or
    /// any error from [`transaction_receipt`](Self::transaction_receipt).
    fn wait_for_receipt(
        &self,
        tx_hash: &TxHash,
        timeout: Duration,
        poll_interval: Duration,
    ) -> Result<Receipt> {
        let started = Instant::now();
        loop {
            if let Some(receipt) = self.transaction_receipt(tx_hash)? {
                return Ok(receipt);
            }
            let waited = started.elapsed();
            if waited >= timeout {
                return Err(Error::ReceiptTimeout {
                    tx_hash: tx_hash.to_string(),
                    waited_ms: waited.as_millis(),
                });
            }
            std::thread::sleep(poll_interval.min(timeout - waited));
        }
    }

    /// Send, wait for the receipt, and fail if execution reverted.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Reverted`] for a failed receipt, or any submission or
    /// wait error.
    fn submit_and_confirm(
        &self,
        request: &TransactionRequest,
        timeout: Duration,
        poll_interval: Duration,
    ) -> Result<Receipt> {
        let tx_hash = self.send_transaction(request)?;
        debug!(%tx_hash, "transaction submitted");
        let receipt = self.wait_for_receipt(&tx_hash, timeout, poll_interval)?;
        if !receipt.status {
            return Err(Error::Reverted {
                tx_hash: tx_hash.to_string(),
                gas_used: receipt.gas_used,
            });
        }
        Ok(receipt)
    }
}

/// Parse a 20-byte hex address, with or without `0x`.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] for bad hex or wrong length.
pub fn parse_address(raw: &str) -> Result<Address> {
    let trimmed = raw.trim();
    let digits = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    let bytes = hex::decode(digits)
        .map_err(|e| Error::InvalidInput(format!("Invalid address {raw}: {e}")))?;
    if bytes.len() != 20 {
        return Err(Error::InvalidInput(format!(
            "Invalid address {raw}: expected 20 bytes, got {}",
            bytes.len()
        )));
    }
    Ok(Address::from_slice(&bytes))
}

/// `0x`-prefixed lowercase hex of an address.
#[must_use]
pub fn format_address(address: &Address) -> String {
    format!("0x{}", hex::encode(address.as_bytes()))
}

/// Parse a JSON-RPC quantity (`0x`-prefixed hex).
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] when the value is not a hex quantity.
pub fn parse_quantity(raw: &str) -> Result<u64> {
    let digits = raw
        .strip_prefix("0x")
        .ok_or_else(|| Error::InvalidInput(format!("Quantity without 0x prefix: {raw}")))?;
    if digits.is_empty() {
        return Err(Error::InvalidInput("Empty quantity".to_string()));
    }
    u64::from_str_radix(digits, 16)
        .map_err(|e| Error::InvalidInput(format!("Invalid quantity {raw}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_roundtrip() {
        let raw = "0x5FbDB2315678afecb367f032d93F642f64180aa3";
        let address = parse_address(raw).unwrap();
        assert_eq!(format_address(&address), raw.to_lowercase());
    }

    #[test]
    fn test_address_without_prefix() {
        assert!(parse_address("5fbdb2315678afecb367f032d93f642f64180aa3").is_ok());
    }

    #[test]
    fn test_address_wrong_length() {
        assert!(matches!(
            parse_address("0x1234"),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_parse_quantity() {
        assert_eq!(parse_quantity("0x0").unwrap(), 0);
        assert_eq!(parse_quantity("0x5208").unwrap(), 21_000);
        assert!(parse_quantity("5208").is_err());
        assert!(parse_quantity("0x").is_err());
        assert!(parse_quantity("0xzz").is_err());
    }

    #[test]
    fn test_selector() {
        let request =
            TransactionRequest::new(Address::zero(), Address::zero(), vec![1, 2, 3, 4, 5]);
        assert_eq!(request.selector(), Some([1, 2, 3, 4]));

        let short = TransactionRequest::new(Address::zero(), Address::zero(), vec![1, 2]);
        assert_eq!(short.selector(), None);
    }

    #[test]
    fn test_wait_for_receipt_times_out() {
        let chain = MemoryChain::new().withhold_receipts();
        let from = chain.accounts().unwrap()[0];
        let tx_hash = chain
            .send_transaction(&TransactionRequest::new(from, from, vec![0; 4]))
            .unwrap();

        let err = chain
            .wait_for_receipt(&tx_hash, Duration::from_millis(30), Duration::from_millis(5))
            .unwrap_err();
        assert!(matches!(err, Error::ReceiptTimeout { .. }));
    }

    #[test]
    fn test_submit_and_confirm_reverted() {
        let selector = [0xaa, 0xbb, 0xcc, 0xdd];
        let chain = MemoryChain::new().revert_selector(selector);
        let from = chain.accounts().unwrap()[0];

        let err = chain
            .submit_and_confirm(
                &TransactionRequest::new(from, from, selector.to_vec()),
                Duration::from_secs(1),
                Duration::from_millis(5),
            )
            .unwrap_err();
        assert!(matches!(err, Error::Reverted { .. }));
    }
}
