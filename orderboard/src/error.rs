use thiserror::Error;

/// Failure of a one-shot call against the orders API.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Request failed: {0}")]
    Transport(#[from] sync_transport::TransportError),

    #[error("Server returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Invalid order id: {0:?}")]
    InvalidId(String),
}

impl ApiError {
    /// HTTP status when the server answered with a non-2xx response
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[derive(Error, Debug)]
pub enum OrderBoardError {
    #[error("Configuration error: {0}")]
    Config(#[from] poll_scheduler::ConfigError),

    #[error("Transport error: {0}")]
    Transport(#[from] sync_transport::TransportError),

    #[error("Scheduler error: {0}")]
    Scheduler(#[from] poll_scheduler::SchedulerError),

    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error("Invalid environment variable {name}: {reason}")]
    Env { name: String, reason: String },
}

pub type Result<T> = std::result::Result<T, OrderBoardError>;
