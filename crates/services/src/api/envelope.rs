//! Decoding of the `{"status": ..., "message": ..., <payload>}` replies the
//! backend wraps every JSON response in.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum Status {
    Success,
    Warning,
    Error,
}

#[derive(Debug)]
pub(crate) struct Reply {
    pub status: Status,
    pub message: Option<String>,
    body: Map<String, Value>,
}

impl Reply {
    /// Remove and decode a required payload field.
    pub fn take<T: DeserializeOwned>(&mut self, key: &'static str) -> Result<T, ApiError> {
        let value = self.body.remove(key).ok_or(ApiError::MissingField(key))?;
        Ok(serde_json::from_value(value)?)
    }

    /// Remove and decode an optional payload field, defaulting when absent.
    pub fn take_or_default<T: DeserializeOwned + Default>(
        &mut self,
        key: &'static str,
    ) -> Result<T, ApiError> {
        match self.body.remove(key) {
            Some(Value::Null) | None => Ok(T::default()),
            Some(value) => Ok(serde_json::from_value(value)?),
        }
    }
}

/// Parse a successful (2xx) body. An `error` status becomes
/// `ApiError::Application`.
pub(crate) fn decode(body: &[u8]) -> Result<Reply, ApiError> {
    let mut body: Map<String, Value> = serde_json::from_slice(body)?;
    let status: Status = match body.remove("status") {
        Some(value) => serde_json::from_value(value)?,
        None => return Err(ApiError::MissingField("status")),
    };
    let message = match body.remove("message") {
        Some(Value::String(message)) => Some(message),
        _ => None,
    };
    if status == Status::Error {
        return Err(ApiError::Application(
            message.unwrap_or_else(|| "the backend reported an error".into()),
        ));
    }
    Ok(Reply {
        status,
        message,
        body,
    })
}

/// Best-effort message from an error body; falls back to the raw text.
pub(crate) fn error_message(body: &[u8]) -> String {
    #[derive(Deserialize)]
    struct ErrorBody {
        message: Option<String>,
    }

    match serde_json::from_slice::<ErrorBody>(body) {
        Ok(ErrorBody {
            message: Some(message),
        }) => message,
        _ => String::from_utf8_lossy(body).trim().chars().take(200).collect(),
    }
}
