//! Connection scopes for the two command families.
//!
//! Each scope opens the substrate connection, hands the connected client to
//! one action, prints the action's output and releases the connection on
//! every exit path.

use std::fmt;
use std::future::Future;
use std::io::Write;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::chain::{Identity, Substrate, TfchainClient};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::rmb::{self, RelayPeer, RpcPeer};

/// What a command prints on success
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutput {
    /// Nothing is printed
    Empty,
    Text(String),
    Number(u64),
}

impl fmt::Display for CommandOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandOutput::Empty => Ok(()),
            CommandOutput::Text(text) => write!(f, "{}", text),
            CommandOutput::Number(n) => write!(f, "{}", n),
        }
    }
}

/// A command run against a connected RMB peer
#[async_trait]
pub trait RpcAction: Send + Sync {
    async fn run(&self, peer: &dyn RpcPeer, timeout: Duration) -> Result<CommandOutput>;
}

/// A command run against the chain with the caller's identity
#[async_trait]
pub trait SubstrateAction: Send + Sync {
    async fn run(&self, sub: &dyn Substrate, identity: &Identity) -> Result<CommandOutput>;
}

/// Write `output` as is, without a trailing newline
pub fn emit<W: Write>(out: &mut W, output: &CommandOutput) -> Result<()> {
    write!(out, "{}", output)
        .and_then(|_| out.flush())
        .map_err(|e| Error::encoding(format!("failed to write output: {}", e)))
}

/// Run `fut` within `deadline`. An elapsed deadline is a `Call` timeout.
pub async fn within<T>(deadline: Duration, fut: impl Future<Output = Result<T>>) -> Result<T> {
    tokio::time::timeout(deadline, fut)
        .await
        .unwrap_or_else(|_| Err(Error::timeout(deadline)))
}

/// Same as [`within`] for steps that open a connection, where an elapsed
/// deadline is a `Connection` failure.
async fn opening<T>(deadline: Duration, fut: impl Future<Output = Result<T>>) -> Result<T> {
    tokio::time::timeout(deadline, fut).await.unwrap_or_else(|_| {
        Err(Error::connection(format!(
            "timed out after {}s",
            deadline.as_secs()
        )))
    })
}

async fn connect(config: &Config, ctx: &str) -> Result<TfchainClient> {
    opening(config.timeout, async {
        TfchainClient::connect(config.substrate_url.as_str())
            .await
            .map_err(Error::from)
    })
    .await
    .map_err(|e| e.context(ctx))
}

/// Open substrate and a relay session, run `action` on the peer and print
/// its output.
pub async fn with_rpc<W: Write>(
    config: &Config,
    mnemonics: &str,
    action: &dyn RpcAction,
    out: &mut W,
) -> Result<()> {
    let client = connect(config, "failed to connect to substrate").await?;
    let result = run_with_peer(&client, config, mnemonics, action).await;
    client.close();
    emit(out, &result?)
}

/// Identity derivation, twin lookup and relay session on an already
/// connected chain, then `action` on the peer. Twin lookup and relay connect
/// fail as `Connection`.
pub async fn run_with_peer(
    sub: &dyn Substrate,
    config: &Config,
    mnemonics: &str,
    action: &dyn RpcAction,
) -> Result<CommandOutput> {
    let session = rmb::new_session_id();
    let identity = Identity::from_phrase(mnemonics)?;

    let twin_id = opening(config.timeout, async {
        sub.get_twin_by_pubkey(identity.public_key())
            .await
            .map_err(|e| Error::connection(e.to_string()))
    })
    .await
    .map_err(|e| e.context("failed to create peer client"))?;

    info!(twin_id, session = %session, relay = %config.relay_url, "Opening relay session");
    let peer = opening(
        config.timeout,
        RelayPeer::connect(&config.relay_url, identity, twin_id, session),
    )
    .await
    .map_err(|e| e.context("failed to create peer client"))?
    .with_ttl(config.timeout);

    action.run(&peer, config.timeout).await
}

/// Open substrate, derive the identity from `mnemonics`, run `action` and
/// print its output.
pub async fn with_substrate<W: Write>(
    config: &Config,
    mnemonics: &str,
    action: &dyn SubstrateAction,
    out: &mut W,
) -> Result<()> {
    let client = connect(config, "failed to create substrate connection").await?;
    let result = run_substrate_action(&client, mnemonics, action, config.timeout).await;
    client.close();
    emit(out, &result?)
}

/// Identity derivation and action dispatch on an already connected chain.
/// The action is bounded by `deadline`.
pub async fn run_substrate_action(
    sub: &dyn Substrate,
    mnemonics: &str,
    action: &dyn SubstrateAction,
    deadline: Duration,
) -> Result<CommandOutput> {
    let identity = Identity::from_phrase(mnemonics)
        .map_err(|e| e.context("failed to create identity"))?;
    debug!(address = %identity.ss58_address(), "Identity derived");

    within(deadline, action.run(sub, &identity)).await
}

/// Print the twin id of `node_id`. Uses its own connection and needs no
/// identity.
pub async fn node_twin<W: Write>(config: &Config, node_id: u32, out: &mut W) -> Result<()> {
    let client = connect(
        config,
        "failed to create substrate connection to get node twin",
    )
    .await?;
    let result = lookup_node_twin(&client, node_id, config.timeout).await;
    client.close();
    emit(out, &result?)
}

pub async fn lookup_node_twin(
    sub: &dyn Substrate,
    node_id: u32,
    deadline: Duration,
) -> Result<CommandOutput> {
    let node = within(deadline, async { sub.get_node(node_id).await.map_err(Error::from) })
        .await
        .map_err(|e| e.context(format!("failed to get node data for Id: {}", node_id)))?;
    Ok(CommandOutput::Number(node.twin_id as u64))
}
