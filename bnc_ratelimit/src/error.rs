use std::fmt;

/// Result type for budget construction
pub type Result<T> = std::result::Result<T, RateLimitError>;

/// Errors raised while configuring a weight budget
///
/// Reservations themselves never fail; they return a wait hint instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitError {
    /// Invalid configuration
    InvalidConfig(&'static str),
}

impl fmt::Display for RateLimitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RateLimitError::InvalidConfig(msg) => write!(f, "Invalid weight budget configuration: {}", msg),
        }
    }
}

impl std::error::Error for RateLimitError {}
