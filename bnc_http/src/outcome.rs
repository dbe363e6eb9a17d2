use std::fmt;
use std::time::Duration;

use bytes::Bytes;
use serde::de::DeserializeOwned;

use crate::errors::ApiError;
use crate::errors::Result;
use crate::marshal;

/// Why a call was deferred
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    /// Local weight budget is spent; nothing was sent
    BudgetExhausted,
    /// Remote answered 429
    RateLimited,
    /// Remote answered 403, typically from the CDN in front of the API
    EdgeRejection,
    /// No response was received
    Transport,
}

/// Retryable outcome carrying a suggested wait
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    pub kind: WarningKind,
    pub retry_after: Duration,
    pub message: String,
}

impl Warning {
    pub fn new(kind: WarningKind, retry_after: Duration, message: impl Into<String>) -> Self {
        Self { kind, retry_after, message: message.into() }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (retry after {:?})", self.message, self.retry_after)
    }
}

/// Result of one logical API call
#[derive(Debug)]
pub enum Outcome<T = Bytes> {
    Success(T),
    Warning(Warning),
    Error(ApiError),
}

impl<T> Outcome<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    pub fn is_warning(&self) -> bool {
        matches!(self, Outcome::Warning(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Outcome::Error(_))
    }

    pub fn warning(&self) -> Option<&Warning> {
        match self {
            Outcome::Warning(warning) => Some(warning),
            _ => None,
        }
    }

    pub fn success(self) -> Option<T> {
        match self {
            Outcome::Success(value) => Some(value),
            _ => None,
        }
    }

    pub fn map<U, F>(self, f: F) -> Outcome<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            Outcome::Success(value) => Outcome::Success(f(value)),
            Outcome::Warning(warning) => Outcome::Warning(warning),
            Outcome::Error(err) => Outcome::Error(err),
        }
    }

    /// Chain a fallible step onto a successful outcome
    pub fn and_then<U, F>(self, f: F) -> Outcome<U>
    where
        F: FnOnce(T) -> Result<U>,
    {
        match self {
            Outcome::Success(value) => match f(value) {
                Ok(next) => Outcome::Success(next),
                Err(err) => Outcome::Error(err),
            },
            Outcome::Warning(warning) => Outcome::Warning(warning),
            Outcome::Error(err) => Outcome::Error(err),
        }
    }
}

impl Outcome<Bytes> {
    /// Parse a successful body into `U`, falling back to the error envelope
    pub fn decode<U: DeserializeOwned>(self) -> Outcome<U> {
        self.and_then(|body| marshal::decode(&body))
    }
}

impl<T> From<ApiError> for Outcome<T> {
    fn from(err: ApiError) -> Self {
        Outcome::Error(err)
    }
}

impl<T> From<Warning> for Outcome<T> {
    fn from(warning: Warning) -> Self {
        Outcome::Warning(warning)
    }
}
