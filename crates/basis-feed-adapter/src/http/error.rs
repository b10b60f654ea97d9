/*
[INPUT]:  Error sources (HTTP, API, payload shape, serialization, WebSocket)
[OUTPUT]: Structured error types with retry and payload hints
[POS]:    Error handling layer - unified error types for entire crate
[UPDATE]: When adding new error sources or improving error messages
*/

use reqwest::StatusCode;
use thiserror::Error;

/// Main error type for the basis feed adapter
#[derive(Error, Debug)]
pub enum FeedError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned a non-success status
    #[error("API error (code {code}): {message}")]
    Api { code: u16, message: String },

    /// Backend answered but the payload was unusable (`success: false`, missing data)
    #[error("Payload rejected: {0}")]
    Rejected(String),

    /// Serialization/deserialization failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// URL parsing failed
    #[error("Invalid URL: {0}")]
    UrlParse(#[from] url::ParseError),

    /// WebSocket error
    #[error("WebSocket error: {0}")]
    WebSocket(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl FeedError {
    /// Check if the error should consume a retry rather than abort the feed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            FeedError::Http(_)
                | FeedError::Api { .. }
                | FeedError::Rejected(_)
                | FeedError::Serialization(_)
                | FeedError::WebSocket(_)
        )
    }

    /// Check if the backend was reachable but sent something we cannot render
    pub fn is_payload_error(&self) -> bool {
        matches!(self, FeedError::Rejected(_) | FeedError::Serialization(_))
    }

    /// Create an API error from status code and message
    pub fn api_error(status: StatusCode, message: impl Into<String>) -> Self {
        FeedError::Api {
            code: status.as_u16(),
            message: message.into(),
        }
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for FeedError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        FeedError::WebSocket(err.to_string())
    }
}

/// Result type alias for basis feed operations
pub type Result<T> = std::result::Result<T, FeedError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_retryable() {
        assert!(FeedError::Rejected("no data".to_string()).is_retryable());
        assert!(FeedError::WebSocket("closed".to_string()).is_retryable());
        assert!(!FeedError::Config("bad url".to_string()).is_retryable());
    }

    #[test]
    fn test_error_is_payload_error() {
        let serde_err = serde_json::from_str::<u32>("\"x\"").expect_err("not a number");
        assert!(FeedError::from(serde_err).is_payload_error());
        assert!(FeedError::Rejected("empty".to_string()).is_payload_error());
        assert!(!FeedError::api_error(StatusCode::BAD_GATEWAY, "down").is_payload_error());
    }

    #[test]
    fn test_api_error_creation() {
        let err = FeedError::api_error(StatusCode::SERVICE_UNAVAILABLE, "maintenance");
        match err {
            FeedError::Api { code, message } => {
                assert_eq!(code, 503);
                assert_eq!(message, "maintenance");
            }
            _ => panic!("Expected Api error variant"),
        }
    }
}
