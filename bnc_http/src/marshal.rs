use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::errors::ApiError;
use crate::errors::Result;

/// Structured error body returned by the API, e.g. `{"code":-1121,"msg":"Invalid symbol."}`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ErrorEnvelope {
    pub code: i64,
    #[serde(alias = "message")]
    pub msg: String,
}

impl From<ErrorEnvelope> for ApiError {
    fn from(envelope: ErrorEnvelope) -> Self {
        ApiError::Api { code: envelope.code, message: envelope.msg }
    }
}

/// Parse `body` as `T`
///
/// When the body does not match `T` but does match the error envelope, the
/// envelope's code and message are returned. Otherwise the original parse
/// error is kept.
pub fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    match serde_json::from_slice::<T>(body) {
        Ok(value) => Ok(value),
        Err(err) => match serde_json::from_slice::<ErrorEnvelope>(body) {
            Ok(envelope) => Err(envelope.into()),
            Err(_) => Err(ApiError::Json(err)),
        },
    }
}
