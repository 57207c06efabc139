//! Contract handles and deployment metadata
//!
//! Two record contracts are compared:
//!
//! ```text
//! BasicRecord        addRecord(uint256 id, string[] fields)
//!                    deleteRecord(uint256 id)
//! LightweightRecord  addRecord(uint256 id, string[] fields, string offChainRef)
//!                    deleteRecord(uint256 id)
//! ```
//!
//! Addresses come from a deployment descriptor (`{"BasicRecord": "0x..",
//! "LightweightRecord": "0x.."}`) and interfaces from Truffle-style build
//! artifacts (`<artifacts_dir>/<Name>.json` with an `abi` field).

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use ethabi::{Address, Contract, Function, ParamType, Token, Uint};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::chain::{format_address, parse_address, TransactionRequest};
use crate::{Error, Result};

const ADD_RECORD: &str = "addRecord";
const DELETE_RECORD: &str = "deleteRecord";

/// Interface of `BasicRecord`, as found in its build artifact.
pub const BASIC_RECORD_ABI: &str = r#"[
    {"type":"function","name":"addRecord","stateMutability":"nonpayable","outputs":[],
     "inputs":[{"name":"id","type":"uint256"},{"name":"fields","type":"string[]"}]},
    {"type":"function","name":"deleteRecord","stateMutability":"nonpayable","outputs":[],
     "inputs":[{"name":"id","type":"uint256"}]}
]"#;

/// Interface of `LightweightRecord`, as found in its build artifact.
pub const LIGHTWEIGHT_RECORD_ABI: &str = r#"[
    {"type":"function","name":"addRecord","stateMutability":"nonpayable","outputs":[],
     "inputs":[{"name":"id","type":"uint256"},{"name":"fields","type":"string[]"},
               {"name":"ipfsHash","type":"string"}]},
    {"type":"function","name":"deleteRecord","stateMutability":"nonpayable","outputs":[],
     "inputs":[{"name":"id","type":"uint256"}]}
]"#;

/// The two contract designs under comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContractVariant {
    /// Stores every field on-chain.
    Basic,
    /// Stores a reference to off-chain content.
    Lightweight,
}

impl ContractVariant {
    /// Processing order within a row.
    pub const ALL: [Self; 2] = [Self::Basic, Self::Lightweight];

    /// Label written to the `contract_name` results column.
    #[must_use]
    pub const fn contract_name(self) -> &'static str {
        match self {
            Self::Basic => "BasicContract",
            Self::Lightweight => "LightweightContract",
        }
    }

    /// Key in the deployment descriptor and artifact file stem.
    #[must_use]
    pub const fn deployment_key(self) -> &'static str {
        match self {
            Self::Basic => "BasicRecord",
            Self::Lightweight => "LightweightRecord",
        }
    }

    /// Whether `addRecord` takes the extra off-chain reference argument.
    #[must_use]
    pub const fn takes_offchain_ref(self) -> bool {
        matches!(self, Self::Lightweight)
    }

    /// Inverse of [`contract_name`](Self::contract_name).
    #[must_use]
    pub fn from_contract_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.contract_name() == name)
    }
}

impl fmt::Display for ContractVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.contract_name())
    }
}

/// A deployed record contract: address plus parsed interface.
#[derive(Debug, Clone)]
pub struct ContractHandle {
    variant: ContractVariant,
    address: Address,
    abi: Contract,
}

impl ContractHandle {
    /// Wrap an already parsed interface.
    #[must_use]
    pub const fn new(variant: ContractVariant, address: Address, abi: Contract) -> Self {
        Self {
            variant,
            address,
            abi,
        }
    }

    /// Parse an ABI JSON array.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Abi`] if the JSON is not a valid contract interface.
    pub fn from_abi_json(
        variant: ContractVariant,
        address: Address,
        abi_json: &str,
    ) -> Result<Self> {
        let abi = Contract::load(abi_json.as_bytes())?;
        Ok(Self::new(variant, address, abi))
    }

    /// Which design this contract implements.
    #[must_use]
    pub const fn variant(&self) -> ContractVariant {
        self.variant
    }

    /// On-chain address.
    #[must_use]
    pub const fn address(&self) -> Address {
        self.address
    }

    /// Calldata for `addRecord`. `offchain_ref` selects the three-argument
    /// overload.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Abi`] if the interface has no matching overload or its
    /// parameter types differ from the expected shape.
    pub fn encode_add_record(
        &self,
        id: usize,
        fields: &[String],
        offchain_ref: Option<&str>,
    ) -> Result<Vec<u8>> {
        let arity = if offchain_ref.is_some() { 3 } else { 2 };
        let function = self.function(ADD_RECORD, arity)?;

        let mut tokens = vec![id_token(function, id)?];

        match &function.inputs[1].kind {
            ParamType::Array(inner) if **inner == ParamType::String => {
                tokens.push(Token::Array(
                    fields.iter().cloned().map(Token::String).collect(),
                ));
            }
            other => {
                return Err(Error::Abi(format!(
                    "{}: {ADD_RECORD} fields must be string[], found {other}",
                    self.variant
                )))
            }
        }

        if let Some(reference) = offchain_ref {
            if function.inputs[2].kind != ParamType::String {
                return Err(Error::Abi(format!(
                    "{}: {ADD_RECORD} off-chain reference must be string, found {}",
                    self.variant, function.inputs[2].kind
                )));
            }
            tokens.push(Token::String(reference.to_string()));
        }

        Ok(function.encode_input(&tokens)?)
    }

    /// Calldata for `deleteRecord(id)`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Abi`] if the interface lacks `deleteRecord(uint)`.
    pub fn encode_delete_record(&self, id: usize) -> Result<Vec<u8>> {
        let function = self.function(DELETE_RECORD, 1)?;
        let token = id_token(function, id)?;
        Ok(function.encode_input(&[token])?)
    }

    /// `addRecord` call from `from` to this contract.
    ///
    /// # Errors
    ///
    /// See [`encode_add_record`](Self::encode_add_record).
    pub fn add_record_request(
        &self,
        from: Address,
        id: usize,
        fields: &[String],
        offchain_ref: Option<&str>,
    ) -> Result<TransactionRequest> {
        let data = self.encode_add_record(id, fields, offchain_ref)?;
        Ok(TransactionRequest::new(from, self.address, data))
    }

    /// `deleteRecord` call from `from` to this contract.
    ///
    /// # Errors
    ///
    /// See [`encode_delete_record`](Self::encode_delete_record).
    pub fn delete_record_request(&self, from: Address, id: usize) -> Result<TransactionRequest> {
        let data = self.encode_delete_record(id)?;
        Ok(TransactionRequest::new(from, self.address, data))
    }

    /// Four-byte selector of a function overload, for matching calldata.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Abi`] if no overload of `name` has `arity` inputs.
    pub fn selector(&self, name: &str, arity: usize) -> Result<[u8; 4]> {
        Ok(self.function(name, arity)?.short_signature())
    }

    fn function(&self, name: &str, arity: usize) -> Result<&Function> {
        self.abi
            .functions_by_name(name)?
            .iter()
            .find(|f| f.inputs.len() == arity)
            .ok_or_else(|| {
                Error::Abi(format!(
                    "{}: no {name} overload with {arity} arguments",
                    self.variant
                ))
            })
    }
}

fn id_token(function: &Function, id: usize) -> Result<Token> {
    let value = Uint::from(id as u64);
    match function.inputs[0].kind {
        ParamType::Uint(_) => Ok(Token::Uint(value)),
        ParamType::Int(_) => Ok(Token::Int(value)),
        ref other => Err(Error::Abi(format!(
            "{}: record id must be an integer, found {other}",
            function.name
        ))),
    }
}

/// Both handles, in processing order.
#[derive(Debug, Clone)]
pub struct Contracts {
    /// Full-data contract
    pub basic: ContractHandle,
    /// Hash-only contract
    pub lightweight: ContractHandle,
}

impl Contracts {
    /// Handles in the fixed per-row order: basic, then lightweight.
    #[must_use]
    pub const fn in_order(&self) -> [&ContractHandle; 2] {
        [&self.basic, &self.lightweight]
    }

    /// Handles built from the bundled reference interfaces instead of build
    /// artifacts. Used for dry runs against an in-memory chain.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Abi`] if a bundled interface fails to parse.
    pub fn reference(basic: Address, lightweight: Address) -> Result<Self> {
        Ok(Self {
            basic: ContractHandle::from_abi_json(ContractVariant::Basic, basic, BASIC_RECORD_ABI)?,
            lightweight: ContractHandle::from_abi_json(
                ContractVariant::Lightweight,
                lightweight,
                LIGHTWEIGHT_RECORD_ABI,
            )?,
        })
    }
}

#[derive(Debug, Deserialize)]
struct Artifact {
    abi: Value,
}

/// Deployment descriptor: logical contract name to address.
///
/// Only the two contract keys are read; other entries (network id, deployer)
/// are kept as they are and never type-checked.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Deployment {
    addresses: HashMap<String, Value>,
}

impl Deployment {
    /// Read a descriptor file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Deployment`] if the file is missing or not a JSON
    /// object.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            Error::Deployment(format!("Failed to read {}: {e}", path.display()))
        })?;
        serde_json::from_str(&raw).map_err(|e| {
            Error::Deployment(format!("Failed to parse {}: {e}", path.display()))
        })
    }

    /// Record an address (used when building a descriptor in code).
    pub fn insert(&mut self, variant: ContractVariant, address: Address) {
        self.addresses.insert(
            variant.deployment_key().to_string(),
            Value::String(format_address(&address)),
        );
    }

    /// Address of a variant.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Deployment`] if the entry is missing or malformed.
    pub fn address(&self, variant: ContractVariant) -> Result<Address> {
        let key = variant.deployment_key();
        let raw = self
            .addresses
            .get(key)
            .ok_or_else(|| Error::Deployment(format!("No address for {key}")))?
            .as_str()
            .ok_or_else(|| Error::Deployment(format!("{key}: address must be a string")))?;
        parse_address(raw).map_err(|e| Error::Deployment(format!("{key}: {e}")))
    }

    /// Build both contract handles, reading ABIs from `artifacts_dir`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Deployment`] for a missing address or artifact and
    /// [`Error::Abi`] for an unparsable interface.
    pub fn contracts<P: AsRef<Path>>(&self, artifacts_dir: P) -> Result<Contracts> {
        let artifacts_dir = artifacts_dir.as_ref();
        let load = |variant: ContractVariant| -> Result<ContractHandle> {
            let address = self.address(variant)?;
            let abi = load_artifact_abi(artifacts_dir, variant)?;
            debug!(%variant, address = %format_address(&address), "contract loaded");
            Ok(ContractHandle::new(variant, address, abi))
        };
        Ok(Contracts {
            basic: load(ContractVariant::Basic)?,
            lightweight: load(ContractVariant::Lightweight)?,
        })
    }
}

fn load_artifact_abi(artifacts_dir: &Path, variant: ContractVariant) -> Result<Contract> {
    let path = artifacts_dir.join(format!("{}.json", variant.deployment_key()));
    let raw = std::fs::read_to_string(&path)
        .map_err(|e| Error::Deployment(format!("Failed to read {}: {e}", path.display())))?;
    let artifact: Artifact = serde_json::from_str(&raw)
        .map_err(|e| Error::Deployment(format!("Failed to parse {}: {e}", path.display())))?;
    let abi = serde_json::to_vec(&artifact.abi)?;
    Ok(Contract::load(abi.as_slice())?)
}
