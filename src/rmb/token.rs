//! Relay authentication token.
//!
//! The relay accepts a compact JWT in the connection query string. Claims
//! name the twin and the session; the signature is the twin's sr25519
//! signature over `header.claims`, prefixed with the key type byte `s`.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::chain::Identity;
use crate::error::{Error, Result};

/// Token lifetime accepted by the relay
pub const TOKEN_TTL_SECS: u64 = 60;

/// Key type marker for sr25519 signatures
pub const SR25519_PREFIX: u8 = b's';

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
struct Header {
    alg: String,
    typ: String,
}

impl Default for Header {
    fn default() -> Self {
        Self {
            alg: "RS512".to_string(),
            typ: "JWT".to_string(),
        }
    }
}

/// Token claims
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// Twin id of the caller
    pub sub: u32,
    pub iat: u64,
    pub exp: u64,
    /// Session identifier
    pub sid: String,
}

impl Claims {
    pub fn new(twin_id: u32, session: impl Into<String>, now: u64) -> Self {
        Self {
            sub: twin_id,
            iat: now,
            exp: now + TOKEN_TTL_SECS,
            sid: session.into(),
        }
    }
}

/// Build and sign a token for `claims`
pub fn sign_token(identity: &Identity, claims: &Claims) -> Result<String> {
    let header = serde_json::to_vec(&Header::default())
        .map_err(|e| Error::encoding(format!("failed to encode token header: {}", e)))?;
    let claims = serde_json::to_vec(claims)
        .map_err(|e| Error::encoding(format!("failed to encode token claims: {}", e)))?;

    let signing_input = format!(
        "{}.{}",
        URL_SAFE_NO_PAD.encode(header),
        URL_SAFE_NO_PAD.encode(claims)
    );

    let mut signature = Vec::with_capacity(65);
    signature.push(SR25519_PREFIX);
    signature.extend_from_slice(&identity.sign(signing_input.as_bytes()));

    Ok(format!(
        "{}.{}",
        signing_input,
        URL_SAFE_NO_PAD.encode(signature)
    ))
}

/// Relay websocket url carrying the token
pub fn relay_url(relay: &str, token: &str) -> String {
    format!("{}/?{}", relay.trim_end_matches('/'), token)
}
