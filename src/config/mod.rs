//! Configuration for the grid client
//! Resolves substrate and relay endpoints from a named network and explicit
//! overrides. Environment fallbacks are handled by the CLI flags.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::rmb::DEFAULT_CALL_TIMEOUT;

/// Default network
pub const DEFAULT_NETWORK: &str = "dev";

pub const DEV_SUBSTRATE_URL: &str = "wss://tfchain.dev.grid.tf/ws";
pub const DEV_RELAY_URL: &str = "wss://relay.dev.grid.tf";
pub const QA_SUBSTRATE_URL: &str = "wss://tfchain.qa.grid.tf/ws";
pub const QA_RELAY_URL: &str = "wss://relay.qa.grid.tf";
pub const TEST_SUBSTRATE_URL: &str = "wss://tfchain.test.grid.tf/ws";
pub const TEST_RELAY_URL: &str = "wss://relay.test.grid.tf";
pub const MAIN_SUBSTRATE_URL: &str = "wss://tfchain.grid.tf/ws";
pub const MAIN_RELAY_URL: &str = "wss://relay.grid.tf";

/// Grid networks with known endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Dev,
    Qa,
    Test,
    Main,
}

impl Network {
    pub fn substrate_url(&self) -> &'static str {
        match self {
            Network::Dev => DEV_SUBSTRATE_URL,
            Network::Qa => QA_SUBSTRATE_URL,
            Network::Test => TEST_SUBSTRATE_URL,
            Network::Main => MAIN_SUBSTRATE_URL,
        }
    }

    pub fn relay_url(&self) -> &'static str {
        match self {
            Network::Dev => DEV_RELAY_URL,
            Network::Qa => QA_RELAY_URL,
            Network::Test => TEST_RELAY_URL,
            Network::Main => MAIN_RELAY_URL,
        }
    }
}

impl std::fmt::Display for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Network::Dev => write!(f, "dev"),
            Network::Qa => write!(f, "qa"),
            Network::Test => write!(f, "test"),
            Network::Main => write!(f, "main"),
        }
    }
}

impl std::str::FromStr for Network {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dev" | "devnet" => Ok(Network::Dev),
            "qa" | "qanet" => Ok(Network::Qa),
            "test" | "testnet" => Ok(Network::Test),
            "main" | "mainnet" => Ok(Network::Main),
            _ => Err(format!(
                "Invalid network '{}'. Valid options: dev, qa, test, main",
                s
            )),
        }
    }
}

/// Connection settings for one invocation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub network: Network,
    pub substrate_url: String,
    pub relay_url: String,
    /// Deadline for each remote call
    #[serde(with = "duration_secs")]
    pub timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self::for_network(Network::Dev)
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Config using the preset endpoints of `network`
    pub fn for_network(network: Network) -> Self {
        Self {
            network,
            substrate_url: network.substrate_url().to_string(),
            relay_url: network.relay_url().to_string(),
            timeout: DEFAULT_CALL_TIMEOUT,
        }
    }

    /// Override the substrate endpoint
    pub fn with_substrate_url(mut self, url: impl Into<String>) -> Self {
        self.substrate_url = url.into();
        self
    }

    /// Override the relay endpoint
    pub fn with_relay_url(mut self, url: impl Into<String>) -> Self {
        self.relay_url = url.into();
        self
    }

    /// Override the call deadline. A zero deadline is rejected.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self, String> {
        if timeout.is_zero() {
            return Err("timeout must be greater than zero".to_string());
        }
        self.timeout = timeout;
        Ok(self)
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}
