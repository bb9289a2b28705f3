//! Message envelope exchanged with the relay.

use std::io::Write;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::chain::Identity;
use crate::error::{Error, Result};
use crate::rmb::token::SR25519_PREFIX;

/// Schema tag for JSON payloads
pub const SCHEMA_JSON: &str = "application/json";

/// A twin address, optionally scoped to one session of that twin
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Address {
    pub twin: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection: Option<String>,
}

impl Address {
    pub fn twin(twin: u32) -> Self {
        Self {
            twin,
            connection: None,
        }
    }

    pub fn session(twin: u32, session: impl Into<String>) -> Self {
        Self {
            twin,
            connection: Some(session.into()),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Request {
    pub command: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Response {}

/// Failure reported by the relay or by the remote handler
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RemoteError {
    #[serde(default)]
    pub code: u32,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Envelope {
    pub uid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
    pub timestamp: u64,
    pub expiration: u64,
    pub source: Address,
    pub destination: Address,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request: Option<Request>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<Response>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<RemoteError>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    /// Base64 encoded body
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<String>,
    /// Hex encoded, key type prefixed signature over [`Envelope::challenge`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

impl Envelope {
    /// A request envelope carrying `data` for `command`
    pub fn request(
        uid: impl Into<String>,
        source: Address,
        destination: Address,
        command: impl Into<String>,
        data: &[u8],
        now: u64,
        ttl: Duration,
    ) -> Self {
        Self {
            uid: uid.into(),
            tags: None,
            timestamp: now,
            expiration: ttl.as_secs(),
            source,
            destination,
            request: Some(Request {
                command: command.into(),
            }),
            response: None,
            error: None,
            schema: Some(SCHEMA_JSON.to_string()),
            payload: Some(STANDARD.encode(data)),
            signature: None,
        }
    }

    /// Digest covering every field except the signature
    pub fn challenge(&self) -> [u8; 32] {
        let mut buf = Vec::new();
        // Writes into a Vec cannot fail
        let _ = write!(buf, "{}", self.uid);
        if let Some(tags) = &self.tags {
            let _ = write!(buf, "{}", tags);
        }
        let _ = write!(buf, "{}{}", self.timestamp, self.expiration);
        write_address(&mut buf, &self.source);
        write_address(&mut buf, &self.destination);
        if let Some(request) = &self.request {
            let _ = write!(buf, "{}", request.command);
        }
        if let Some(error) = &self.error {
            let _ = write!(buf, "{}{}", error.code, error.message);
        }
        if let Some(schema) = &self.schema {
            let _ = write!(buf, "{}", schema);
        }
        if let Some(payload) = &self.payload {
            buf.extend_from_slice(payload.as_bytes());
        }

        Sha256::digest(&buf).into()
    }

    /// Sign the envelope with `identity`
    pub fn sign(&mut self, identity: &Identity) {
        let mut signature = Vec::with_capacity(65);
        signature.push(SR25519_PREFIX);
        signature.extend_from_slice(&identity.sign(&self.challenge()));
        self.signature = Some(hex::encode(signature));
    }

    /// Decoded body bytes
    pub fn data(&self) -> Result<Vec<u8>> {
        match &self.payload {
            Some(payload) => STANDARD
                .decode(payload)
                .map_err(|e| Error::call(format!("invalid reply payload encoding: {}", e))),
            None => Ok(Vec::new()),
        }
    }

    /// Turn a reply envelope into the JSON result of the call. An empty body
    /// is a `null` result.
    pub fn into_reply(self) -> Result<Value> {
        if let Some(error) = self.error {
            return Err(Error::call(format!(
                "remote error (code {}): {}",
                error.code, error.message
            )));
        }

        let data = self.data()?;
        if data.is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_slice(&data)
            .map_err(|e| Error::call(format!("invalid reply body: {}", e)))
    }
}

fn write_address(buf: &mut Vec<u8>, address: &Address) {
    let _ = write!(buf, "{}", address.twin);
    if let Some(connection) = &address.connection {
        let _ = write!(buf, "{}", connection);
    }
}
