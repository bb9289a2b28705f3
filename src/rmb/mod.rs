//! RMB (reliable message bus) peer client.
//!
//! Commands reach a node's RPC endpoint through the relay. Handlers only see
//! the [`RpcPeer`] trait; [`RelayPeer`] is the websocket implementation used
//! by the binary.
//!
//! # Example
//!
//! ```ignore
//! use tfgrid_vclient::rmb::{self, RelayPeer, DEFAULT_CALL_TIMEOUT};
//!
//! let peer = RelayPeer::connect("wss://relay.dev.grid.tf", identity, twin_id, rmb::new_session_id()).await?;
//! let ports: Vec<u16> = rmb::call(&peer, 11, "zos.network.list_wg_ports", &(), DEFAULT_CALL_TIMEOUT).await?;
//! ```

pub mod envelope;
pub mod relay;
pub mod token;

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::{Error, Result};

pub use envelope::{Address, Envelope, RemoteError};
pub use relay::RelayPeer;

/// Prefix of every session identifier opened by this client
pub const SESSION_PREFIX: &str = "tfgrid-vclient";

/// Deadline applied to each remote call
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(120);

/// A connected peer able to invoke named methods on remote twins.
#[async_trait]
pub trait RpcPeer: Send + Sync {
    /// Call `cmd` on twin `dst` with a JSON payload and return the JSON reply.
    /// `Value::Null` is sent for calls without arguments.
    async fn call_raw(&self, dst: u32, cmd: &str, payload: Value) -> Result<Value>;
}

/// Session identifier from an explicit random source
pub fn session_id<R: Rng + ?Sized>(rng: &mut R) -> String {
    format!("{}-{}", SESSION_PREFIX, rng.random::<u64>())
}

/// Session identifier for this invocation, seeded from the current time.
/// Collisions between concurrent invocations are not guarded against.
pub fn new_session_id() -> String {
    let seed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0);
    let mut rng = StdRng::seed_from_u64(seed);
    session_id(&mut rng)
}

/// Typed call: serialize `payload`, bound the call by `timeout` and decode
/// the reply into `R`.
pub async fn call<P, R>(
    peer: &dyn RpcPeer,
    dst: u32,
    cmd: &str,
    payload: &P,
    timeout: Duration,
) -> Result<R>
where
    P: Serialize + ?Sized + Sync,
    R: DeserializeOwned,
{
    let payload = serde_json::to_value(payload)
        .map_err(|e| Error::encoding(format!("failed to encode {} payload: {}", cmd, e)))?;

    debug!(dst, cmd, "Calling remote method");
    let reply = tokio::time::timeout(timeout, peer.call_raw(dst, cmd, payload))
        .await
        .map_err(|_| Error::timeout(timeout))??;

    serde_json::from_value(reply)
        .map_err(|e| Error::call(format!("unexpected {} reply: {}", cmd, e)))
}
