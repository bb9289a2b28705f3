//! Flag parsing helpers and terminal output.

use std::fmt;
use std::str::FromStr;

use console::{style, Term};
use serde::de::DeserializeOwned;

use crate::chain::contracts::DEPLOYMENT_HASH_LEN;
use crate::error::{Error, Result};

/// Solution provider flag. The zero id means "no solution provider" and is
/// turned into `None` here, once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SolutionProviderId(Option<u64>);

impl SolutionProviderId {
    pub fn get(&self) -> Option<u64> {
        self.0
    }
}

impl From<u64> for SolutionProviderId {
    fn from(id: u64) -> Self {
        SolutionProviderId((id != 0).then_some(id))
    }
}

impl FromStr for SolutionProviderId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        s.trim().parse::<u64>().map(Self::from)
    }
}

impl fmt::Display for SolutionProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.unwrap_or(0))
    }
}

/// Parse an embedded JSON flag value
pub fn parse_json<T: DeserializeOwned>(flag: &str, raw: &str) -> Result<T> {
    serde_json::from_str(raw).map_err(|e| Error::payload(format!("invalid --{} JSON: {}", flag, e)))
}

/// Serialize a successful result as JSON text
pub fn to_json<T: serde::Serialize + ?Sized>(what: &str, value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(|e| Error::encoding(format!("failed to marshal {}: {}", what, e)))
}

/// Decode a hex flag value; a leading `0x` is accepted
pub fn decode_hex(flag: &str, raw: &str) -> Result<Vec<u8>> {
    let raw = raw.trim();
    let raw = raw.strip_prefix("0x").unwrap_or(raw);
    hex::decode(raw).map_err(|e| Error::payload(format!("invalid --{} hex: {}", flag, e)))
}

/// Deployment hashes are the 32 character hex md5 digest computed by the node
pub fn check_deployment_hash(hash: &str) -> Result<()> {
    if hash.len() != DEPLOYMENT_HASH_LEN {
        return Err(Error::payload(format!(
            "deployment hash must be {} characters, got {}",
            DEPLOYMENT_HASH_LEN,
            hash.len()
        )));
    }
    Ok(())
}

/// Print error message in red on stderr.
pub fn print_error(message: &str) {
    let term = Term::stderr();
    let _ = term.write_line(&format!("{} {}", style("✗").red().bold(), message));
}
