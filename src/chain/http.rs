//! Ethereum JSON-RPC client over blocking HTTP

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use ethabi::Address;
use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use super::{
    format_address, parse_address, parse_quantity, ChainClient, Receipt, TransactionRequest, TxHash,
};
use crate::{Error, Result};

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawReceipt {
    transaction_hash: String,
    gas_used: String,
    /// Absent on pre-Byzantium chains
    #[serde(default)]
    status: Option<String>,
}

/// JSON-RPC 2.0 client for an Ethereum node that manages unlocked accounts
/// (Ganache, Hardhat, Anvil, geth `--dev`).
#[derive(Debug)]
pub struct HttpChainClient {
    url: String,
    client: Client,
    next_id: AtomicU64,
}

impl HttpChainClient {
    /// Create a client for `url`; every HTTP request is bounded by
    /// `request_timeout`.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built.
    pub fn new(url: impl Into<String>, request_timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(request_timeout).build()?;
        Ok(Self {
            url: url.into(),
            client,
            next_id: AtomicU64::new(1),
        })
    }

    /// Endpoint URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    fn request<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });
        debug!(method, id, "rpc request");

        let response = self.client.post(&self.url).json(&body).send()?;
        // Nodes may pair a 4xx/5xx with a JSON-RPC error body; keep the body.
        let status_error = response.error_for_status_ref().err();
        let text = response.text()?;
        let parsed = serde_json::from_str::<RpcResponse>(&text);

        if let Ok(RpcResponse {
            error: Some(err), ..
        }) = &parsed
        {
            return Err(Error::Rpc {
                method: method.to_string(),
                code: err.code,
                message: err.message.clone(),
            });
        }
        if let Some(e) = status_error {
            return Err(e.into());
        }
        let response = parsed.map_err(|e| Error::MalformedResponse {
            method: method.to_string(),
            detail: e.to_string(),
        })?;

        serde_json::from_value(response.result.unwrap_or(Value::Null)).map_err(|e| {
            Error::MalformedResponse {
                method: method.to_string(),
                detail: e.to_string(),
            }
        })
    }

    fn estimate_gas(&self, call: &Value) -> Result<String> {
        self.request("eth_estimateGas", json!([call]))
    }
}

fn call_object(request: &TransactionRequest) -> Value {
    json!({
        "from": format_address(&request.from),
        "to": format_address(&request.to),
        "data": format!("0x{}", hex::encode(&request.data)),
    })
}

fn malformed(method: &str, err: &Error) -> Error {
    Error::MalformedResponse {
        method: method.to_string(),
        detail: err.to_string(),
    }
}

impl ChainClient for HttpChainClient {
    fn accounts(&self) -> Result<Vec<Address>> {
        let raw: Vec<String> = self.request("eth_accounts", json!([]))?;
        raw.iter()
            .map(|a| parse_address(a).map_err(|e| malformed("eth_accounts", &e)))
            .collect()
    }

    fn send_transaction(&self, request: &TransactionRequest) -> Result<TxHash> {
        // Nodes fall back to a small default gas limit, so estimate first.
        let mut call = call_object(request);
        let gas = self.estimate_gas(&call)?;
        call["gas"] = Value::String(gas);

        let hash: String = self.request("eth_sendTransaction", json!([call]))?;
        Ok(TxHash::new(hash))
    }

    fn transaction_receipt(&self, tx_hash: &TxHash) -> Result<Option<Receipt>> {
        const METHOD: &str = "eth_getTransactionReceipt";
        let raw: Option<RawReceipt> = self.request(METHOD, json!([tx_hash.as_str()]))?;
        let Some(raw) = raw else {
            return Ok(None);
        };

        let gas_used = parse_quantity(&raw.gas_used).map_err(|e| malformed(METHOD, &e))?;
        let status = match raw.status.as_deref() {
            None => true,
            Some(s) => parse_quantity(s).map_err(|e| malformed(METHOD, &e))? == 1,
        };

        Ok(Some(Receipt {
            tx_hash: TxHash::new(raw.transaction_hash),
            gas_used,
            status,
        }))
    }
}
