//! Error types for the sync transport

use thiserror::Error;

/// Errors raised by an [`HttpClient`](crate::HttpClient) while performing a request.
///
/// These never escape [`SyncTransport::fetch`](crate::SyncTransport::fetch); they are
/// folded into [`FetchError`] and surfaced as a failed outcome.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection refused, reset, DNS failure and friends
    #[error("Network error: {0}")]
    Network(String),

    /// The request did not complete within the configured timeout
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// The endpoint URL could not be built
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The request could not be constructed (bad header value, etc.)
    #[error("Invalid request: {0}")]
    Request(String),
}

impl From<url::ParseError> for TransportError {
    fn from(err: url::ParseError) -> Self {
        TransportError::InvalidUrl(err.to_string())
    }
}

/// Human-readable cause carried by [`FetchOutcome::Failed`](crate::FetchOutcome::Failed).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The request never produced an HTTP response
    #[error("Network error: {0}")]
    Network(String),

    /// The server answered with something other than 200 or 304
    #[error("Unexpected HTTP status {status}")]
    Status { status: u16 },

    /// A 200 response whose body was not the expected JSON array
    #[error("Malformed response body: {0}")]
    Decode(String),
}

impl From<TransportError> for FetchError {
    fn from(err: TransportError) -> Self {
        FetchError::Network(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_error_display() {
        let error = TransportError::Network("connection refused".to_string());
        assert_eq!(error.to_string(), "Network error: connection refused");

        let error = TransportError::Timeout("after 10s".to_string());
        assert_eq!(error.to_string(), "Request timed out: after 10s");
    }

    #[test]
    fn test_fetch_error_display() {
        assert_eq!(
            FetchError::Status { status: 503 }.to_string(),
            "Unexpected HTTP status 503"
        );
        assert_eq!(
            FetchError::Decode("expected array".to_string()).to_string(),
            "Malformed response body: expected array"
        );
    }

    #[test]
    fn test_transport_error_folds_into_fetch_error() {
        let fetch_error: FetchError = TransportError::Timeout("after 10s".to_string()).into();
        assert_eq!(
            fetch_error,
            FetchError::Network("Request timed out: after 10s".to_string())
        );
    }
}
