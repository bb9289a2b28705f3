pub mod contracts;
pub mod decode;
pub mod identity;
pub mod queries;
pub mod signer;

use async_trait::async_trait;
use subxt::{blocks::ExtrinsicEvents, dynamic::Value, PolkadotConfig};
use thiserror::Error;
use tracing::{debug, info};

pub use identity::Identity;
pub use signer::TfchainSigner;

use crate::types::{BatchCreateContractData, NodeInfo};

/// Error types for chain operations
#[derive(Debug, Error)]
pub enum Error {
    #[error("Failed to connect to {url}: {message}")]
    ConnectionFailed { url: String, message: String },
    #[error("Subxt error: {0}")]
    Subxt(#[from] subxt::Error),
    #[error("Encoding error: {0}")]
    Encoding(String),
    #[error("Decoding error: {0}")]
    Decoding(String),
    #[error("Transaction error: {0}")]
    Transaction(String),
    #[error("{0} not found")]
    NotFound(String),
}

impl Error {
    pub fn connection_failed(url: &str, message: impl ToString) -> Self {
        Error::ConnectionFailed {
            url: url.to_string(),
            message: message.to_string(),
        }
    }
}

/// The chain operations the command handlers rely on.
///
/// [`TfchainClient`] is the live implementation; tests substitute in-memory
/// doubles.
#[async_trait]
pub trait Substrate: Send + Sync {
    async fn create_name_contract(&self, identity: &Identity, name: &str) -> Result<u64, Error>;

    async fn create_rent_contract(
        &self,
        identity: &Identity,
        node_id: u32,
        solution_provider: Option<u64>,
    ) -> Result<u64, Error>;

    async fn create_node_contract(
        &self,
        identity: &Identity,
        node_id: u32,
        body: &str,
        hash: &str,
        public_ips: u32,
        solution_provider: Option<u64>,
    ) -> Result<u64, Error>;

    async fn update_node_contract(
        &self,
        identity: &Identity,
        contract_id: u64,
        body: &str,
        hash: &str,
    ) -> Result<u64, Error>;

    async fn cancel_contract(&self, identity: &Identity, contract_id: u64) -> Result<(), Error>;

    async fn batch_all_create_contract(
        &self,
        identity: &Identity,
        contracts: &[BatchCreateContractData],
    ) -> Result<Vec<u64>, Error>;

    async fn batch_cancel_contract(
        &self,
        identity: &Identity,
        contract_ids: &[u64],
    ) -> Result<(), Error>;

    async fn get_twin_by_pubkey(&self, public_key: &[u8; 32]) -> Result<u32, Error>;

    async fn get_node(&self, node_id: u32) -> Result<NodeInfo, Error>;
}

/// TFChain client for interacting with the chain
pub struct TfchainClient {
    api: subxt::OnlineClient<PolkadotConfig>,
    url: String,
}

impl TfchainClient {
    /// Connect to the substrate endpoint. Plain `ws://` endpoints are accepted
    /// for local chains.
    pub async fn connect(url: impl Into<String>) -> Result<Self, Error> {
        let url = url.into();
        debug!(url = %url, "Connecting to substrate");

        let api = if url.starts_with("ws://") || url.starts_with("http://") {
            subxt::OnlineClient::<PolkadotConfig>::from_insecure_url(&url).await
        } else {
            subxt::OnlineClient::<PolkadotConfig>::from_url(&url).await
        }
        .map_err(|e| Error::connection_failed(&url, e))?;

        info!(url = %url, "Connected to substrate");
        Ok(Self { api, url })
    }

    /// Release the connection. Dropping the client has the same effect; this
    /// only makes the release point explicit and logged.
    pub fn close(self) {
        debug!(url = %self.url, "Closing substrate connection");
        drop(self);
    }

    /// Query a storage entry at the latest finalized block
    pub async fn storage(
        &self,
        module: &str,
        entry: &str,
        keys: Vec<Value>,
    ) -> Result<Option<Value>, Error> {
        let storage_query = subxt::dynamic::storage(module, entry, keys);
        let storage = self.api.storage().at_latest().await?;
        let value = storage.fetch(&storage_query).await?;

        match value {
            Some(thunk) => match thunk.to_value() {
                Ok(v) => Ok(Some(v.remove_context())),
                Err(e) => Err(Error::Decoding(format!(
                    "Failed to decode {}.{}: {}",
                    module, entry, e
                ))),
            },
            None => Ok(None),
        }
    }

    /// Submit a dynamic extrinsic and wait until it is finalized successfully.
    pub async fn submit_extrinsic(
        &self,
        module: &str,
        function: &str,
        args: Vec<Value>,
        signer: &TfchainSigner,
    ) -> Result<ExtrinsicEvents<PolkadotConfig>, Error> {
        let call = subxt::dynamic::tx(module, function, args);
        debug!(module, function, "Submitting extrinsic");

        let progress = self
            .api
            .tx()
            .sign_and_submit_then_watch_default(&call, signer)
            .await?;

        let events = progress
            .wait_for_finalized_success()
            .await
            .map_err(|e| Error::Transaction(format!("{}.{}: {}", module, function, e)))?;

        debug!(
            module,
            function,
            extrinsic = ?events.extrinsic_hash(),
            "Extrinsic finalized"
        );
        Ok(events)
    }
}

impl Drop for TfchainClient {
    fn drop(&mut self) {
        tracing::trace!(url = %self.url, "Substrate connection released");
    }
}
