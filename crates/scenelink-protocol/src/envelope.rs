//! Uniform success/error wrapper returned for every request.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Response envelope.
///
/// Serialises as `{"status":"success","result":...}` or
/// `{"status":"error","error":"..."}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Envelope {
    /// The command completed and produced `result`.
    Success {
        /// Handler output.
        result: Value,
    },
    /// The command failed.
    Error {
        /// Human-readable failure description.
        error: String,
    },
}

impl Envelope {
    /// Wraps a successful result.
    #[must_use]
    pub const fn success(result: Value) -> Self {
        Self::Success { result }
    }

    /// Wraps a failure message.
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            error: message.into(),
        }
    }

    /// Builds an envelope from a handler's JSON result.
    ///
    /// Handlers signal failure with `"success": false` and an optional
    /// `"error"` string. Any other result, including one without a
    /// `success` field, is a success and is passed through untouched.
    #[must_use]
    pub fn from_handler_result(result: Value) -> Self {
        if result.get("success").and_then(Value::as_bool) == Some(false) {
            let message = result
                .get("error")
                .and_then(Value::as_str)
                .unwrap_or_default();
            return Self::error(message);
        }
        Self::success(result)
    }

    /// Returns `true` for a success envelope.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Converts the envelope into a `Result`.
    ///
    /// # Errors
    ///
    /// Returns the error message carried by an error envelope.
    pub fn into_result(self) -> Result<Value, String> {
        match self {
            Self::Success { result } => Ok(result),
            Self::Error { error } => Err(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(json!({"actors": []}))]
    #[case(json!({"success": true, "deleted_actor": "Cube"}))]
    #[case(json!({"success": "false"}))]
    #[case(json!([1, 2, 3]))]
    fn results_without_false_success_are_successes(#[case] result: Value) {
        let envelope = Envelope::from_handler_result(result.clone());
        assert_eq!(envelope, Envelope::Success { result });
    }

    #[rstest]
    fn false_success_becomes_error() {
        let envelope = Envelope::from_handler_result(json!({"success": false, "error": "X"}));
        assert_eq!(envelope, Envelope::error("X"));
    }

    #[rstest]
    fn missing_error_message_defaults_to_empty() {
        let envelope = Envelope::from_handler_result(json!({"success": false}));
        assert_eq!(envelope, Envelope::error(""));
    }

    #[rstest]
    fn serialises_success_shape() {
        let envelope = Envelope::success(json!({"message": "pong"}));
        let encoded = serde_json::to_value(&envelope).expect("serialise envelope");
        assert_eq!(
            encoded,
            json!({"status": "success", "result": {"message": "pong"}})
        );
    }

    #[rstest]
    fn serialises_error_shape() {
        let envelope = Envelope::error("Unknown command: bogus");
        let encoded = serde_json::to_value(&envelope).expect("serialise envelope");
        assert_eq!(
            encoded,
            json!({"status": "error", "error": "Unknown command: bogus"})
        );
    }

    #[rstest]
    fn deserialises_both_shapes() {
        let success: Envelope =
            serde_json::from_str(r#"{"status":"success","result":{}}"#).expect("decode success");
        assert!(success.is_success());
        let failure: Envelope =
            serde_json::from_str(r#"{"status":"error","error":"boom"}"#).expect("decode error");
        assert_eq!(failure.into_result(), Err("boom".to_owned()));
    }
}
