//! Error types for the poll-scheduler crate.

/// A poll configuration that would give undefined backoff behaviour.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// The multiplier must be finite and greater than 1
    #[error("Backoff multiplier must be a finite number greater than 1, got {0}")]
    InvalidMultiplier(f64),

    /// An interval was zero
    #[error("Invalid interval: {0}")]
    InvalidInterval(String),

    /// The ceiling is below the base interval
    #[error("Max interval ({max:?}) must not be less than base interval ({base:?})")]
    IntervalOrder {
        base: std::time::Duration,
        max: std::time::Duration,
    },
}

/// Errors raised while starting or shutting down a scheduler.
///
/// Individual fetch failures are never reported here; they become
/// [`ConnectionStatus::Error`](crate::ConnectionStatus::Error) in the poll state.
#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    /// The configuration was rejected
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// `start` was called outside a tokio runtime
    #[error("No tokio runtime available: {0}")]
    NoRuntime(String),

    /// The poll task panicked or could not be joined
    #[error("Failed to await poll task: {0}")]
    TaskJoin(String),
}

/// Convenience type alias for Results using SchedulerError.
pub type Result<T> = std::result::Result<T, SchedulerError>;
