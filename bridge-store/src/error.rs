//! Error types for bridge-store.

use std::path::PathBuf;

use portbridge_core::EngineError;

/// Errors from loading or saving the store file.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Failed to read the store file.
    #[error("failed to read store file {path}: {source}")]
    ReadError {
        /// Path to the store file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to parse the store file.
    #[error("failed to parse store file {path}: {source}")]
    ParseError {
        /// Path to the store file.
        path: PathBuf,
        /// Underlying TOML parse error.
        source: toml::de::Error,
    },

    /// Failed to serialize the store.
    #[error("failed to serialize store: {0}")]
    SerializeError(#[from] toml::ser::Error),

    /// Failed to write the store file.
    #[error("failed to write store file {path}: {source}")]
    WriteError {
        /// Path being written.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

impl From<StoreError> for EngineError {
    fn from(err: StoreError) -> Self {
        EngineError::Persistence(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_error_maps_to_persistence() {
        let err = StoreError::WriteError {
            path: PathBuf::from("/ro/store.toml"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        let engine: EngineError = err.into();
        assert!(matches!(engine, EngineError::Persistence(_)));
        assert!(engine.to_string().contains("/ro/store.toml"));
    }
}
