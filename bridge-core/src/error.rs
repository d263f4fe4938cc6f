//! Error types for bridge-core.
//!
//! Every failure a call can hit is a [`BridgeError`]. At the boundary all of
//! them flatten to the envelope's `message` text; Dart only ever sees the
//! string, so the `Display` output is the contract.

use thiserror::Error;

/// Errors reported by an [`Engine`](crate::Engine).
#[derive(Debug, Error)]
pub enum EngineError {
    /// No remote with this name.
    #[error("remote not found: {0}")]
    RemoteNotFound(String),

    /// A remote with this name already exists.
    #[error("remote already exists: {0}")]
    RemoteExists(String),

    /// The remote name is not usable.
    #[error("invalid remote name {name:?}: {reason}")]
    InvalidName {
        /// The rejected name.
        name: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The option is managed by the engine and cannot be set directly.
    #[error("option {0:?} is reserved")]
    ReservedOption(String),

    /// The change was applied but could not be saved.
    #[error("failed to persist config: {0}")]
    Persistence(String),

    /// Any other backend failure.
    #[error("engine error: {0}")]
    Backend(String),
}

/// Errors from running one call.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// A JSON argument did not match the operation's input schema.
    #[error("{0}")]
    Decode(#[source] serde_json::Error),

    /// A required argument was empty.
    #[error("{0}")]
    Validation(String),

    /// The engine rejected the operation.
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// The result could not be serialized.
    #[error("{0}")]
    Encode(#[source] serde_json::Error),

    /// No operation is registered under this name.
    #[error("unknown operation: {0}")]
    UnknownOperation(String),

    /// Wrong number of arguments for the operation.
    #[error("{operation} expects {expected} argument(s), got {actual}")]
    Arity {
        /// Operation name.
        operation: String,
        /// Declared parameter count.
        expected: usize,
        /// Supplied argument count.
        actual: usize,
    },

    /// The handler panicked; the panic was contained.
    #[error("operation panicked: {0}")]
    Panicked(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_message_is_verbatim() {
        let err = BridgeError::Validation("itemID cannot be empty".to_string());
        assert_eq!(err.to_string(), "itemID cannot be empty");
    }

    #[test]
    fn decode_message_is_the_parser_text() {
        let parse_err = serde_json::from_str::<serde_json::Value>("not-json").unwrap_err();
        let expected = parse_err.to_string();
        let err = BridgeError::Decode(parse_err);
        assert_eq!(err.to_string(), expected);
        assert!(!expected.is_empty());
    }

    #[test]
    fn engine_errors_pass_through() {
        let err: BridgeError = EngineError::RemoteNotFound("s3box".to_string()).into();
        assert!(matches!(err, BridgeError::Engine(_)));
        assert_eq!(err.to_string(), "remote not found: s3box");
    }

    #[test]
    fn display_is_human_readable() {
        let err = EngineError::InvalidName {
            name: "-bad".to_string(),
            reason: "must not start with '-' or space".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "invalid remote name \"-bad\": must not start with '-' or space"
        );

        let err = BridgeError::Arity {
            operation: "deleteRemote".to_string(),
            expected: 1,
            actual: 2,
        };
        assert_eq!(err.to_string(), "deleteRemote expects 1 argument(s), got 2");
    }

    #[test]
    fn errors_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<BridgeError>();
        assert_send_sync::<EngineError>();
    }
}
