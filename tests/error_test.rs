//! Tests for error types

use record_bench::Error;

#[test]
fn test_rpc_error() {
    let error = Error::Rpc {
        method: "eth_sendTransaction".to_string(),
        code: -32000,
        message: "insufficient funds".to_string(),
    };
    let error_str = format!("{error}");
    assert!(error_str.contains("RPC error -32000"));
    assert!(error_str.contains("eth_sendTransaction"));
    assert!(error_str.contains("insufficient funds"));
}

#[test]
fn test_malformed_response_error() {
    let error = Error::MalformedResponse {
        method: "eth_accounts".to_string(),
        detail: "missing result".to_string(),
    };
    let error_str = format!("{error}");
    assert!(error_str.contains("Malformed RPC response"));
    assert!(error_str.contains("missing result"));
}

#[test]
fn test_reverted_error() {
    let error = Error::Reverted {
        tx_hash: "0xabc".to_string(),
        gas_used: 23_000,
    };
    let error_str = format!("{error}");
    assert!(error_str.contains("0xabc"));
    assert!(error_str.contains("reverted"));
    assert!(error_str.contains("23000"));
}

#[test]
fn test_receipt_timeout_error() {
    let error = Error::ReceiptTimeout {
        tx_hash: "0x01".to_string(),
        waited_ms: 1500,
    };
    let error_str = format!("{error}");
    assert!(error_str.contains("No receipt for 0x01"));
    assert!(error_str.contains("1500 ms"));
    assert!(error_str.contains("Is the node mining?"));
}

#[test]
fn test_no_accounts_error() {
    let error_str = format!("{}", Error::NoAccounts);
    assert!(error_str.contains("no accounts"));
}

#[test]
fn test_string_variants() {
    let cases = [
        (Error::Abi("unknown function".to_string()), "ABI error"),
        (Error::Deployment("No address".to_string()), "Deployment error"),
        (Error::Dataset("ragged row".to_string()), "Dataset error"),
        (Error::OffChain("pin failed".to_string()), "Off-chain store error"),
        (Error::StorageError("file not found".to_string()), "Storage error"),
        (Error::InvalidInput("poll_interval_ms".to_string()), "Invalid input"),
    ];
    for (error, prefix) in cases {
        assert!(format!("{error}").starts_with(prefix), "{error}");
    }
}

#[test]
fn test_io_error_conversion() {
    let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
    let error: Error = io_error.into();
    let error_str = format!("{error}");
    assert!(error_str.contains("IO error"));
    assert!(error_str.contains("file not found"));
}

#[test]
fn test_json_error_conversion() {
    let json_error = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    let error: Error = json_error.into();
    assert!(matches!(error, Error::Json(_)));
}

#[test]
fn test_other_error() {
    let error = Error::Other("custom error message".to_string());
    assert!(format!("{error}").contains("custom error message"));
}

#[test]
fn test_error_debug_format() {
    let error = Error::Abi("bad token".to_string());
    let debug_str = format!("{error:?}");
    assert!(debug_str.contains("Abi"));
}
