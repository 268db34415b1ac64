//! Normalized API response envelope
//!
//! The backend answers with one of two envelope shapes:
//!
//! ```text
//! { "result": "SUCCESS" | "FAIL", "data": ..., "message": ... }
//! { "success": true | false, "data": ..., "error": { "message": ... }, "message": ... }
//! ```
//!
//! Both are parsed into [`ApiResult`] at the pipeline boundary so callers
//! never branch on the shape.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::constants::RESULT_SUCCESS;

/// Envelope decoding errors
#[derive(Debug, Error)]
pub enum EnvelopeError {
    /// `data` did not match the expected payload type
    #[error("Invalid envelope payload: {0}")]
    Payload(#[from] serde_json::Error),

    /// The envelope reported success but carried no `data`
    #[error("Envelope is missing data")]
    MissingData,
}

/// Backend result normalized from either envelope shape
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiResult<T> {
    /// `result: "SUCCESS"` or `success: true`
    Success { data: Option<T>, message: Option<String> },
    /// `result: "FAIL"` or `success: false`
    Failure { message: Option<String> },
}

impl<T: DeserializeOwned> ApiResult<T> {
    /// Parse a decoded response body into the normalized envelope
    ///
    /// A body that carries neither marker is treated as a bare successful
    /// payload, and `null` as an empty success.
    ///
    /// # Errors
    /// Returns [`EnvelopeError::Payload`] if `data` does not deserialize into
    /// `T`.
    pub fn from_value(value: Value) -> Result<Self, EnvelopeError> {
        let mut map = match value {
            Value::Object(map) => map,
            Value::Null => return Ok(Self::Success { data: None, message: None }),
            other => {
                return Ok(Self::Success { data: Some(serde_json::from_value(other)?), message: None })
            }
        };

        let succeeded = match (map.get("result"), map.get("success")) {
            (Some(Value::String(result)), _) => Some(result.eq_ignore_ascii_case(RESULT_SUCCESS)),
            (_, Some(Value::Bool(success))) => Some(*success),
            _ => None,
        };

        let Some(succeeded) = succeeded else {
            return Ok(Self::Success {
                data: Some(serde_json::from_value(Value::Object(map))?),
                message: None,
            });
        };

        let message = error_message_in(&map).map(str::to_string);

        if !succeeded {
            return Ok(Self::Failure { message });
        }

        let data = match map.remove("data") {
            None | Some(Value::Null) => None,
            Some(data) => Some(serde_json::from_value(data)?),
        };

        Ok(Self::Success { data, message })
    }
}

impl<T> ApiResult<T> {
    /// Whether the backend reported success
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Payload of a successful result, if any
    #[must_use]
    pub fn into_data(self) -> Option<T> {
        match self {
            Self::Success { data, .. } => data,
            Self::Failure { .. } => None,
        }
    }

    /// Payload of a successful result, failing when it is absent
    ///
    /// # Errors
    /// Returns [`EnvelopeError::MissingData`] on failure or an empty success.
    pub fn require_data(self) -> Result<T, EnvelopeError> {
        self.into_data().ok_or(EnvelopeError::MissingData)
    }

    /// Message attached by the backend, if any
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Success { message, .. } | Self::Failure { message } => message.as_deref(),
        }
    }

    /// Map the payload type
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ApiResult<U> {
        match self {
            Self::Success { data, message } => ApiResult::Success { data: data.map(f), message },
            Self::Failure { message } => ApiResult::Failure { message },
        }
    }
}

/// Extract a human readable message from an error body
///
/// Precedence: `error.message`, then top-level `message`. Callers supply
/// their own fallback when this returns `None`.
///
/// ```
/// use armageddon_domain::error_message;
/// use serde_json::json;
///
/// let body = json!({ "error": { "message": "A" }, "message": "B" });
/// assert_eq!(error_message(&body), Some("A"));
/// assert_eq!(error_message(&json!({ "message": "B" })), Some("B"));
/// assert_eq!(error_message(&json!({})), None);
/// ```
#[must_use]
pub fn error_message(body: &Value) -> Option<&str> {
    body.as_object().and_then(error_message_in)
}

fn error_message_in(map: &Map<String, Value>) -> Option<&str> {
    map.get("error")
        .and_then(|error| error.get("message"))
        .and_then(Value::as_str)
        .filter(|message| !message.is_empty())
        .or_else(|| map.get("message").and_then(Value::as_str).filter(|m| !m.is_empty()))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn result_shape_success_with_data() {
        let parsed: ApiResult<Vec<i64>> =
            ApiResult::from_value(json!({ "result": "SUCCESS", "data": [1, 2] })).unwrap();
        assert_eq!(parsed, ApiResult::Success { data: Some(vec![1, 2]), message: None });
    }

    #[test]
    fn success_shape_failure_prefers_error_message() {
        let parsed: ApiResult<Value> = ApiResult::from_value(json!({
            "success": false,
            "error": { "message": "A" },
            "message": "B"
        }))
        .unwrap();
        assert_eq!(parsed, ApiResult::Failure { message: Some("A".to_string()) });
    }

    #[test]
    fn result_fail_shape_uses_top_level_message() {
        let parsed: ApiResult<Value> =
            ApiResult::from_value(json!({ "result": "FAIL", "message": "B" })).unwrap();
        assert!(!parsed.is_success());
        assert_eq!(parsed.message(), Some("B"));
    }

    #[test]
    fn null_data_is_empty_success() {
        let parsed: ApiResult<Vec<i64>> =
            ApiResult::from_value(json!({ "success": true, "data": null })).unwrap();
        assert!(parsed.is_success());
        assert!(matches!(parsed.require_data(), Err(EnvelopeError::MissingData)));
    }

    #[test]
    fn bare_payload_without_marker_is_success() {
        let parsed: ApiResult<Vec<String>> = ApiResult::from_value(json!(["a", "b"])).unwrap();
        assert_eq!(parsed.into_data(), Some(vec!["a".to_string(), "b".to_string()]));
    }

    #[test]
    fn mismatched_payload_is_an_error() {
        let parsed = ApiResult::<Vec<i64>>::from_value(json!({ "result": "SUCCESS", "data": "x" }));
        assert!(matches!(parsed, Err(EnvelopeError::Payload(_))));
    }

    #[test]
    fn empty_messages_are_skipped() {
        let body = json!({ "error": { "message": "" }, "message": "B" });
        assert_eq!(error_message(&body), Some("B"));
        assert_eq!(error_message(&json!("plain text")), None);
    }
}
