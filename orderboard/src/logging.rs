//! Logging setup for order board consumers
//!
//! Libraries in this workspace only emit `tracing` events. Applications pick
//! how those events are rendered by calling one of the init functions here
//! once at startup.

use tracing_subscriber::{fmt, EnvFilter, Registry};

pub const ENV_LOG_MODE: &str = "ORDERBOARD_LOG_MODE";
pub const ENV_LOG_LEVEL: &str = "ORDERBOARD_LOG_LEVEL";

/// How log events are rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoggingMode {
    /// No subscriber; events are dropped
    Silent,
    /// Compact single-line output on stderr
    Development,
    /// Verbose output with thread ids and source locations
    Debug,
}

impl LoggingMode {
    /// Parse a mode name; unknown names give `None`
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "silent" | "off" => Some(LoggingMode::Silent),
            "development" | "dev" => Some(LoggingMode::Development),
            "debug" => Some(LoggingMode::Debug),
            _ => None,
        }
    }

    fn default_level(self) -> &'static str {
        match self {
            LoggingMode::Silent => "off",
            LoggingMode::Development => "info",
            LoggingMode::Debug => "debug",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("Failed to initialize tracing subscriber: {0}")]
    TracingInit(String),

    #[error("Invalid log filter {filter:?}: {reason}")]
    InvalidFilter { filter: String, reason: String },
}

/// Install a global subscriber for `mode`.
///
/// The filter comes from `ORDERBOARD_LOG_LEVEL`, then `RUST_LOG`, then the
/// mode's default level.
pub fn init_logging(mode: LoggingMode) -> Result<(), LoggingError> {
    let filter = env_filter(mode.default_level())?;
    install(mode, filter)
}

/// Install a global subscriber with an explicit filter directive such as
/// `"info"` or `"orderboard=debug,poll_scheduler=trace"`
pub fn init_logging_with_filter(mode: LoggingMode, directive: &str) -> Result<(), LoggingError> {
    let filter = parse_filter(directive)?;
    install(mode, filter)
}

/// Pick the mode from `ORDERBOARD_LOG_MODE`; defaults to silent
pub fn init_logging_from_env() -> Result<(), LoggingError> {
    let mode = std::env::var(ENV_LOG_MODE)
        .ok()
        .and_then(|name| LoggingMode::from_name(&name))
        .unwrap_or(LoggingMode::Silent);

    init_logging(mode)
}

/// True once any global subscriber has been installed
pub fn is_initialized() -> bool {
    tracing::dispatcher::has_been_set()
}

fn install(mode: LoggingMode, filter: EnvFilter) -> Result<(), LoggingError> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    match mode {
        LoggingMode::Silent => Ok(()),
        LoggingMode::Development => Registry::default()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false)
                    .compact(),
            )
            .with(filter)
            .try_init()
            .map_err(|e| LoggingError::TracingInit(e.to_string())),
        LoggingMode::Debug => Registry::default()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .pretty()
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .with(filter)
            .try_init()
            .map_err(|e| LoggingError::TracingInit(e.to_string())),
    }
}

fn env_filter(default_level: &str) -> Result<EnvFilter, LoggingError> {
    let directive = std::env::var(ENV_LOG_LEVEL)
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| default_level.to_string());

    parse_filter(&directive)
}

fn parse_filter(directive: &str) -> Result<EnvFilter, LoggingError> {
    EnvFilter::try_new(directive).map_err(|e| LoggingError::InvalidFilter {
        filter: directive.to_string(),
        reason: e.to_string(),
    })
}
