//! Off-chain content store
//!
//! The lightweight contract stores only a reference to the row content. By
//! default no content is uploaded and every row gets [`PLACEHOLDER_REF`], so
//! a run needs no IPFS node. Set `offchain = "ipfs"` to upload and pin each
//! row instead.

use std::time::Duration;

use reqwest::blocking::{multipart, Client};
use serde::Deserialize;
use tracing::debug;

use crate::config::{BenchConfig, OffChainMode};
use crate::{Error, Result};

/// Reference passed when nothing is uploaded
pub const PLACEHOLDER_REF: &str = "unpinned";

/// Content-addressed storage for row payloads.
pub trait OffChainStore {
    /// Store `content` under `name` and return its content identifier.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OffChain`] if the content cannot be stored.
    fn put(&self, name: &str, content: &str) -> Result<String>;
}

/// Store that uploads nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlaceholderStore;

impl OffChainStore for PlaceholderStore {
    fn put(&self, _name: &str, _content: &str) -> Result<String> {
        Ok(PLACEHOLDER_REF.to_string())
    }
}

#[derive(Debug, Deserialize)]
struct AddResponse {
    #[serde(rename = "Hash")]
    hash: String,
}

/// Kubo (go-ipfs) HTTP API client.
#[derive(Debug)]
pub struct IpfsStore {
    api_url: String,
    client: Client,
}

impl IpfsStore {
    /// Client for an API root such as `http://localhost:5001/api/v0`.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built.
    pub fn new(api_url: impl Into<String>, request_timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(request_timeout).build()?;
        Ok(Self {
            api_url: api_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.api_url)
    }
}

impl OffChainStore for IpfsStore {
    fn put(&self, name: &str, content: &str) -> Result<String> {
        let part = multipart::Part::text(content.to_string()).file_name(name.to_string());
        let form = multipart::Form::new().part("file", part);

        let response = self
            .client
            .post(self.endpoint("add"))
            .multipart(form)
            .send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::OffChain(format!(
                "add returned {status}: {}",
                response.text().unwrap_or_default()
            )));
        }
        let added: AddResponse = response.json()?;

        let pin = self
            .client
            .post(self.endpoint("pin/add"))
            .query(&[("arg", added.hash.as_str())])
            .send()?;
        if !pin.status().is_success() {
            return Err(Error::OffChain(format!(
                "pin of {} returned {}",
                added.hash,
                pin.status()
            )));
        }

        debug!(name, cid = %added.hash, "content pinned");
        Ok(added.hash)
    }
}

/// Build the store selected by `config.offchain`.
///
/// # Errors
///
/// Returns error if the IPFS client cannot be built.
pub fn from_config(config: &BenchConfig) -> Result<Box<dyn OffChainStore>> {
    Ok(match config.offchain {
        OffChainMode::Placeholder => Box::new(PlaceholderStore),
        OffChainMode::Ipfs => Box::new(IpfsStore::new(
            config.ipfs_api_url.clone(),
            config.request_timeout(),
        )?),
    })
}
