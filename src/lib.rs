pub mod chain;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod rmb;
pub mod types;

pub use chain::{Error as ChainError, Identity, Substrate, TfchainClient};
pub use config::{Config, Network};
pub use error::{Error, Result};

pub use logging::{
    init_logging, is_initialized, CompactFormatter, GridFormatter, JsonFormatter, LogFormat,
    LoggingConfig,
};

pub use rmb::{RelayPeer, RpcPeer};

pub use types::*;
