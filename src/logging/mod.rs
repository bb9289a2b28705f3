//! Logging for the grid client
//!
//! Diagnostics are written to stderr so stdout only ever carries the command
//! result. Formats are text, JSON or compact, with an optional daily rolling
//! file next to the terminal output.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use tfgrid_vclient::logging::{init_logging, LogFormat, LoggingConfig};
//!
//! // -vv on the command line
//! let config = LoggingConfig::new()
//!     .with_verbosity(2)
//!     .with_format(LogFormat::Compact);
//! init_logging(&config);
//! ```

pub mod format;

use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Once, OnceLock};

use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;

use tracing_subscriber::fmt::{self, MakeWriter};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

pub use format::{CompactFormatter, GridFormatter, JsonFormatter};

/// File name of the rolling log
pub const LOG_FILE_NAME: &str = "tfvclient.log";

static INIT: Once = Once::new();

static INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Keeps the non-blocking file writer flushing for the life of the process
static FILE_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// `YYYY-MM-DD HH:MM:SS | LEVEL | target | message`
    #[default]
    Text,
    /// One JSON object per line
    Json,
    /// `[LEVEL] message`
    Compact,
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogFormat::Text => write!(f, "text"),
            LogFormat::Json => write!(f, "json"),
            LogFormat::Compact => write!(f, "compact"),
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            "compact" => Ok(LogFormat::Compact),
            _ => Err(format!(
                "Invalid log format '{}'. Valid options: text, json, compact",
                s
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Number of `-v` flags: 0 warn, 1 info, 2 debug, 3 or more trace
    pub verbosity: u8,
    /// Also write to a rolling file in `logging_dir`
    pub record_log: bool,
    /// Supports `~` for the home directory
    pub logging_dir: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            verbosity: 0,
            record_log: false,
            logging_dir: "~/.tfgrid/logs".to_string(),
            format: LogFormat::Text,
        }
    }
}

impl LoggingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_verbosity(mut self, verbosity: u8) -> Self {
        self.verbosity = verbosity;
        self
    }

    pub fn with_file_logging(mut self, enabled: bool) -> Self {
        self.record_log = enabled;
        self
    }

    pub fn with_logging_dir(mut self, dir: impl Into<String>) -> Self {
        self.logging_dir = dir.into();
        self
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    fn level(&self) -> Level {
        match self.verbosity {
            0 => Level::WARN,
            1 => Level::INFO,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        }
    }

    fn expand_path(&self) -> PathBuf {
        let path = &self.logging_dir;
        if let Some(stripped) = path.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(stripped);
            }
        }
        PathBuf::from(path)
    }
}

/// Install the global subscriber. Only the first call has an effect.
///
/// `RUST_LOG`, when set, replaces the level derived from the verbosity.
pub fn init_logging(config: &LoggingConfig) {
    INIT.call_once(|| {
        init_logging_internal(config);
        INITIALIZED.store(true, Ordering::SeqCst);
    });
}

pub fn is_initialized() -> bool {
    INITIALIZED.load(Ordering::SeqCst)
}

fn env_filter(config: &LoggingConfig) -> EnvFilter {
    if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::new(format!(
            "{},jsonrpsee=warn,soketto=warn,tungstenite=warn,rustls=warn",
            config.level()
        ))
    }
}

fn format_layer<W>(format: LogFormat, writer: W, ansi: bool) -> Box<dyn Layer<Registry> + Send + Sync>
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let layer = fmt::layer().with_writer(writer).with_ansi(ansi);
    match format {
        LogFormat::Text => layer.event_format(GridFormatter).boxed(),
        LogFormat::Json => layer.event_format(JsonFormatter).boxed(),
        LogFormat::Compact => layer.event_format(CompactFormatter).boxed(),
    }
}

fn init_logging_internal(config: &LoggingConfig) {
    let mut layers = vec![format_layer(config.format, io::stderr, true)];

    if config.record_log {
        let log_dir = config.expand_path();
        match std::fs::create_dir_all(&log_dir) {
            Ok(()) => {
                let appender = tracing_appender::rolling::daily(&log_dir, LOG_FILE_NAME);
                let (writer, guard) = tracing_appender::non_blocking(appender);
                let _ = FILE_GUARD.set(guard);
                layers.push(format_layer(config.format, writer, false));
            }
            Err(e) => eprintln!(
                "Warning: Failed to create log directory {:?}: {}",
                log_dir, e
            ),
        }
    }

    let _ = tracing_subscriber::registry()
        .with(layers)
        .with(env_filter(config))
        .try_init();
}
