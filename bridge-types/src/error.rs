//! Error types for portbridge wire handling.

use thiserror::Error;

/// Errors from encoding or reading a response envelope.
#[derive(Debug, Error)]
pub enum WireError {
    /// JSON serialization failed
    #[error("serialization failed: {0}")]
    Serialization(#[source] serde_json::Error),

    /// JSON deserialization failed
    #[error("deserialization failed: {0}")]
    Deserialization(#[source] serde_json::Error),

    /// The envelope reports a failed call; its message is carried here
    #[error("call failed: {0}")]
    CallFailed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = WireError::CallFailed("itemID cannot be empty".to_string());
        assert_eq!(err.to_string(), "call failed: itemID cannot be empty");
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<WireError>();
    }
}
