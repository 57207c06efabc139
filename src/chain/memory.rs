//! In-process chain for tests and dry runs

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use ethabi::Address;

use super::{ChainClient, Receipt, TransactionRequest, TxHash};
use crate::{Error, Result};

/// Base cost of any transaction
const TX_BASE_GAS: u64 = 21_000;
const ZERO_BYTE_GAS: u64 = 4;
const NONZERO_BYTE_GAS: u64 = 16;
/// Flat charge per 32-byte calldata word, standing in for storage writes
const WORD_GAS: u64 = 2_000;

#[derive(Debug, Default)]
struct MemoryState {
    sent: Vec<TransactionRequest>,
    receipts: HashMap<TxHash, Receipt>,
}

/// Deterministic in-memory chain.
///
/// Every transaction is "mined" instantly; gas is derived from the calldata
/// so that longer payloads cost more. Failures can be injected to exercise
/// the abort path of a run.
#[derive(Debug)]
pub struct MemoryChain {
    accounts: Vec<Address>,
    fail_on_send: Option<usize>,
    revert_selectors: HashSet<[u8; 4]>,
    withhold_receipts: bool,
    state: Mutex<MemoryState>,
}

impl Default for MemoryChain {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryChain {
    /// Chain with a single funded dev account.
    #[must_use]
    pub fn new() -> Self {
        Self::with_accounts(vec![Address::from_low_u64_be(0x1000)])
    }

    /// Chain exposing the given accounts (may be empty).
    #[must_use]
    pub fn with_accounts(accounts: Vec<Address>) -> Self {
        Self {
            accounts,
            fail_on_send: None,
            revert_selectors: HashSet::new(),
            withhold_receipts: false,
            state: Mutex::new(MemoryState::default()),
        }
    }

    /// Reject submissions with an RPC error once `n` have been accepted.
    #[must_use]
    pub const fn fail_on_send(mut self, n: usize) -> Self {
        self.fail_on_send = Some(n);
        self
    }

    /// Mine calls to `selector` with a failed receipt.
    #[must_use]
    pub fn revert_selector(mut self, selector: [u8; 4]) -> Self {
        self.revert_selectors.insert(selector);
        self
    }

    /// Accept transactions but never produce receipts.
    #[must_use]
    pub const fn withhold_receipts(mut self) -> Self {
        self.withhold_receipts = true;
        self
    }

    /// Transactions accepted so far, in submission order.
    #[must_use]
    pub fn sent(&self) -> Vec<TransactionRequest> {
        self.lock().sent.clone()
    }

    /// Gas this chain charges for `data`.
    #[must_use]
    pub fn gas_for(data: &[u8]) -> u64 {
        let bytes: u64 = data
            .iter()
            .map(|b| if *b == 0 { ZERO_BYTE_GAS } else { NONZERO_BYTE_GAS })
            .sum();
        let words = data.len().saturating_sub(4).div_ceil(32) as u64;
        TX_BASE_GAS + bytes + words * WORD_GAS
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ChainClient for MemoryChain {
    fn accounts(&self) -> Result<Vec<Address>> {
        Ok(self.accounts.clone())
    }

    fn send_transaction(&self, request: &TransactionRequest) -> Result<TxHash> {
        let mut state = self.lock();
        let nonce = state.sent.len();
        if self.fail_on_send == Some(nonce) {
            return Err(Error::Rpc {
                method: "eth_sendTransaction".to_string(),
                code: -32000,
                message: format!("injected failure at submission {nonce}"),
            });
        }

        let tx_hash = TxHash::new(format!("0x{nonce:064x}"));
        state.sent.push(request.clone());

        if !self.withhold_receipts {
            let status = request
                .selector()
                .map_or(true, |s| !self.revert_selectors.contains(&s));
            state.receipts.insert(
                tx_hash.clone(),
                Receipt {
                    tx_hash: tx_hash.clone(),
                    gas_used: Self::gas_for(&request.data),
                    status,
                },
            );
        }

        Ok(tx_hash)
    }

    fn transaction_receipt(&self, tx_hash: &TxHash) -> Result<Option<Receipt>> {
        Ok(self.lock().receipts.get(tx_hash).cloned())
    }
}
