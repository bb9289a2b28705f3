//! Websocket connection to the RMB relay.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, trace, warn};
use uuid::Uuid;

use crate::chain::Identity;
use crate::error::{Error, Result};
use crate::rmb::envelope::{Address, Envelope};
use crate::rmb::token::{relay_url, sign_token, Claims};
use crate::rmb::{RpcPeer, DEFAULT_CALL_TIMEOUT};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// RMB peer bound to one relay session.
///
/// Calls are serialized over a single websocket; replies are matched to the
/// request by envelope uid and anything else on the socket is dropped.
///
/// Envelopes are JSON signed over a sha256 challenge. This is not
/// wire-compatible with the production relay, which exchanges protobuf
/// envelopes signed over an md5 challenge.
pub struct RelayPeer {
    socket: Mutex<Socket>,
    identity: Identity,
    twin_id: u32,
    session: String,
    ttl: Duration,
}

impl RelayPeer {
    /// Open a session on `relay` as twin `twin_id`.
    pub async fn connect(
        relay: &str,
        identity: Identity,
        twin_id: u32,
        session: impl Into<String>,
    ) -> Result<Self> {
        let session = session.into();
        let claims = Claims::new(twin_id, session.clone(), unix_now());
        let token = sign_token(&identity, &claims)?;

        debug!(relay, twin_id, session = %session, "Connecting to relay");
        let (socket, _) = tokio_tungstenite::connect_async(relay_url(relay, &token))
            .await
            .map_err(|e| Error::connection(format!("failed to connect to relay {}: {}", relay, e)))?;

        Ok(Self {
            socket: Mutex::new(socket),
            identity,
            twin_id,
            session,
            ttl: DEFAULT_CALL_TIMEOUT,
        })
    }

    /// Lifetime the relay gives each request; matches the call deadline.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    async fn send(&self, socket: &mut Socket, envelope: &Envelope) -> Result<()> {
        let bytes = serde_json::to_vec(envelope)
            .map_err(|e| Error::encoding(format!("failed to encode envelope: {}", e)))?;
        socket
            .send(Message::Binary(bytes))
            .await
            .map_err(|e| Error::call(format!("failed to send request: {}", e)))
    }

    async fn receive(&self, socket: &mut Socket, uid: &str) -> Result<Envelope> {
        while let Some(message) = socket.next().await {
            let message = message.map_err(|e| Error::call(format!("relay read failed: {}", e)))?;
            let bytes = match message {
                Message::Binary(bytes) => bytes,
                Message::Text(text) => text.into_bytes(),
                Message::Close(frame) => {
                    return Err(Error::call(format!("relay closed the session: {:?}", frame)))
                }
                _ => continue,
            };

            let envelope: Envelope = match serde_json::from_slice(&bytes) {
                Ok(envelope) => envelope,
                Err(e) => {
                    warn!(error = %e, "Dropping undecodable relay message");
                    continue;
                }
            };

            if envelope.uid != uid {
                trace!(uid = %envelope.uid, "Dropping unrelated relay message");
                continue;
            }
            return Ok(envelope);
        }

        Err(Error::call("relay connection ended before a reply arrived"))
    }
}

fn signed_request(
    identity: &Identity,
    source: Address,
    uid: String,
    dst: u32,
    cmd: &str,
    data: &[u8],
    ttl: Duration,
) -> Envelope {
    let mut envelope = Envelope::request(uid, source, Address::twin(dst), cmd, data, unix_now(), ttl);
    envelope.sign(identity);
    envelope
}

#[async_trait]
impl RpcPeer for RelayPeer {
    async fn call_raw(&self, dst: u32, cmd: &str, payload: Value) -> Result<Value> {
        let data = serde_json::to_vec(&payload)
            .map_err(|e| Error::encoding(format!("failed to encode {} payload: {}", cmd, e)))?;

        let uid = Uuid::new_v4().to_string();
        let envelope = signed_request(
            &self.identity,
            Address::session(self.twin_id, self.session.clone()),
            uid.clone(),
            dst,
            cmd,
            &data,
            self.ttl,
        );

        let mut socket = self.socket.lock().await;
        self.send(&mut socket, &envelope).await?;
        debug!(uid = %uid, dst, cmd, "Request sent");

        let reply = self.receive(&mut socket, &uid).await?;
        reply.into_reply()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_expiration_follows_ttl() {
        let identity = Identity::from_phrase("//Alice").unwrap();
        let envelope = signed_request(
            &identity,
            Address::session(29, "tfgrid-vclient-7"),
            "b1d2".into(),
            11,
            "zos.network.list_wg_ports",
            b"null",
            Duration::from_secs(300),
        );
        assert_eq!(envelope.expiration, 300);
        assert_eq!(envelope.destination, Address::twin(11));
        assert!(envelope.signature.is_some());
    }
}
