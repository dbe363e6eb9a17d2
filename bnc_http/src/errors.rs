use bnc_ratelimit::RateLimitError;
use reqwest::StatusCode;
use thiserror::Error;

/// Unrecoverable failure of a single API call
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Unexpected status {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("API error: {code} - {message}")]
    Api { code: i64, message: String },

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to read response body: {0}")]
    Body(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("HTTP client construction failed: {0}")]
    Client(#[from] reqwest::Error),

    #[error("Weight budget: {0}")]
    Budget(#[from] RateLimitError),
}

/// Failure reported by a transport before a response could be classified
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Request never produced a response (DNS, connect, timeout)
    #[error("request failed: {0}")]
    Request(String),

    /// Response headers arrived but the body could not be read (timeouts excluded)
    #[error("body read failed: {0}")]
    Body(String),
}

pub type Result<T> = std::result::Result<T, ApiError>;
