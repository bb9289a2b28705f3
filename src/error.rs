//! Error types for the grid client

use std::time::Duration;
use thiserror::Error;

/// Result type alias using the client's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the grid client.
///
/// Every failure falls into one of five categories. Handlers add one layer of
/// context with [`Error::context`], which keeps the category intact so the
/// caller can still tell a connection problem from a failed remote call.
#[derive(Error, Debug)]
pub enum Error {
    /// Substrate or relay endpoint could not be reached
    #[error("Connection error: {0}")]
    Connection(String),

    /// Missing or invalid mnemonic
    #[error("Identity error: {0}")]
    Identity(String),

    /// Malformed user supplied payload (JSON, hex, hash length)
    #[error("Payload error: {0}")]
    Payload(String),

    /// The remote method or extrinsic failed, including timeouts
    #[error("Call error: {0}")]
    Call(String),

    /// A successful result could not be serialized
    #[error("Encoding error: {0}")]
    Encoding(String),
}

impl Error {
    pub fn connection(msg: impl Into<String>) -> Self {
        Error::Connection(msg.into())
    }

    pub fn identity(msg: impl Into<String>) -> Self {
        Error::Identity(msg.into())
    }

    pub fn payload(msg: impl Into<String>) -> Self {
        Error::Payload(msg.into())
    }

    pub fn call(msg: impl Into<String>) -> Self {
        Error::Call(msg.into())
    }

    pub fn encoding(msg: impl Into<String>) -> Self {
        Error::Encoding(msg.into())
    }

    /// A call that did not complete within its deadline
    pub fn timeout(deadline: Duration) -> Self {
        Error::Call(format!("call timed out after {}s", deadline.as_secs()))
    }

    /// Prefix the message with `ctx`, keeping the category.
    pub fn context(self, ctx: impl std::fmt::Display) -> Self {
        match self {
            Error::Connection(m) => Error::Connection(format!("{}: {}", ctx, m)),
            Error::Identity(m) => Error::Identity(format!("{}: {}", ctx, m)),
            Error::Payload(m) => Error::Payload(format!("{}: {}", ctx, m)),
            Error::Call(m) => Error::Call(format!("{}: {}", ctx, m)),
            Error::Encoding(m) => Error::Encoding(format!("{}: {}", ctx, m)),
        }
    }

    /// Short category name, used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Connection(_) => "connection",
            Error::Identity(_) => "identity",
            Error::Payload(_) => "payload",
            Error::Call(_) => "call",
            Error::Encoding(_) => "encoding",
        }
    }
}

impl From<crate::chain::Error> for Error {
    fn from(e: crate::chain::Error) -> Self {
        match e {
            e @ crate::chain::Error::ConnectionFailed { .. } => Error::Connection(e.to_string()),
            other => Error::Call(other.to_string()),
        }
    }
}
