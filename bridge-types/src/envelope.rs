//! Response envelope - the one message every call produces.
//!
//! On the wire this is always the flat record
//! `{ "success": bool, "message": string, "data": string }` that existing
//! Dart clients decode. Inside the bridge the result of a call is an
//! [`Outcome`], so a success can never carry a message and a failure can
//! never carry data.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::WireError;

/// Result of one call, before it is flattened onto the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The operation ran. `data` is the JSON-encoded result, if it has one.
    Success {
        /// JSON-encoded result payload.
        data: Option<String>,
    },
    /// The call failed at some step.
    Failure {
        /// Human-readable diagnostic.
        message: String,
    },
}

impl Outcome {
    /// A success with no result payload.
    pub fn done() -> Self {
        Outcome::Success { data: None }
    }

    /// A success carrying an already encoded JSON payload.
    pub fn with_data(data: String) -> Self {
        Outcome::Success { data: Some(data) }
    }

    /// A failure with the given message.
    pub fn failure(message: impl Into<String>) -> Self {
        Outcome::Failure {
            message: message.into(),
        }
    }

    /// Whether this outcome is a success.
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success { .. })
    }
}

/// The wire record delivered to a call token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    /// Whether the call succeeded.
    pub success: bool,
    /// Diagnostic text, empty on success.
    #[serde(default)]
    pub message: String,
    /// JSON-encoded result, empty on failure or for unit results.
    #[serde(default)]
    pub data: String,
}

impl ResponseEnvelope {
    /// Encode to the JSON wire form.
    pub fn to_json(&self) -> Result<String, WireError> {
        serde_json::to_string(self).map_err(WireError::Serialization)
    }

    /// Decode from the JSON wire form.
    pub fn from_json(json: &str) -> Result<Self, WireError> {
        serde_json::from_str(json).map_err(WireError::Deserialization)
    }

    /// Recover the outcome this envelope was built from.
    pub fn outcome(&self) -> Outcome {
        if !self.success {
            return Outcome::failure(self.message.clone());
        }
        if self.data.is_empty() {
            Outcome::done()
        } else {
            Outcome::with_data(self.data.clone())
        }
    }

    /// Decode the `data` payload the way a client does in its second step.
    ///
    /// Returns `Ok(None)` for a successful call without a result and
    /// [`WireError::CallFailed`] when the envelope reports a failure.
    pub fn decode_data<T: DeserializeOwned>(&self) -> Result<Option<T>, WireError> {
        if !self.success {
            return Err(WireError::CallFailed(self.message.clone()));
        }
        if self.data.is_empty() {
            return Ok(None);
        }
        serde_json::from_str(&self.data)
            .map(Some)
            .map_err(WireError::Deserialization)
    }
}

impl From<Outcome> for ResponseEnvelope {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Success { data } => Self {
                success: true,
                message: String::new(),
                data: data.unwrap_or_default(),
            },
            Outcome::Failure { message } => Self {
                success: false,
                message,
                data: String::new(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn failure_wire_form_keeps_all_fields() {
        let envelope = ResponseEnvelope::from(Outcome::failure("itemID cannot be empty"));
        assert_eq!(
            envelope.to_json().unwrap(),
            r#"{"success":false,"message":"itemID cannot be empty","data":""}"#
        );
    }

    #[test]
    fn unit_success_wire_form() {
        let envelope = ResponseEnvelope::from(Outcome::done());
        assert_eq!(
            envelope.to_json().unwrap(),
            r#"{"success":true,"message":"","data":""}"#
        );
    }

    #[test]
    fn data_is_a_nested_json_string() {
        let envelope = ResponseEnvelope::from(Outcome::with_data(r#"{"port":8080}"#.to_string()));
        assert_eq!(
            envelope.to_json().unwrap(),
            r#"{"success":true,"message":"","data":"{\"port\":8080}"}"#
        );
    }

    #[test]
    fn from_json_tolerates_missing_optional_fields() {
        let envelope = ResponseEnvelope::from_json(r#"{"success":true}"#).unwrap();
        assert!(envelope.success);
        assert!(envelope.message.is_empty());
        assert!(envelope.data.is_empty());
    }

    #[test]
    fn from_json_rejects_missing_success() {
        let err = ResponseEnvelope::from_json(r#"{"message":"x"}"#).unwrap_err();
        assert!(matches!(err, WireError::Deserialization(_)));
    }

    #[test]
    fn outcome_survives_the_flat_record() {
        for outcome in [
            Outcome::done(),
            Outcome::with_data("[1,2]".to_string()),
            Outcome::failure("boom"),
        ] {
            let envelope = ResponseEnvelope::from(outcome.clone());
            assert_eq!(envelope.outcome(), outcome);
        }
    }

    #[test]
    fn decode_data_reproduces_result() {
        let mut remote = BTreeMap::new();
        remote.insert("name".to_string(), "s3box".to_string());
        let envelope =
            ResponseEnvelope::from(Outcome::with_data(serde_json::to_string(&remote).unwrap()));

        let decoded: BTreeMap<String, String> = envelope.decode_data().unwrap().unwrap();
        assert_eq!(decoded, remote);
    }

    #[test]
    fn decode_data_on_failure_reports_message() {
        let envelope = ResponseEnvelope::from(Outcome::failure("remote not found: x"));
        let err = envelope.decode_data::<String>().unwrap_err();
        assert!(matches!(err, WireError::CallFailed(ref m) if m == "remote not found: x"));
    }

    #[test]
    fn decode_data_on_unit_success_is_none() {
        let envelope = ResponseEnvelope::from(Outcome::done());
        assert!(envelope.decode_data::<String>().unwrap().is_none());
    }
}
