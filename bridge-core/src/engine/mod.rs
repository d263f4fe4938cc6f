//! Engine abstraction.
//!
//! The engine owns all real state (general settings, configured remotes)
//! and its own locking. Operations call it from worker threads, so every
//! method is blocking and the trait is `Send + Sync`.

mod mock;

pub use mock::MockEngine;

use portbridge_types::{GeneralConfig, NewRemote, RemoteConfig, RemoteOptions};

use crate::EngineError;

/// The sync engine as seen by the bridge.
pub trait Engine: Send + Sync {
    /// Current general settings.
    fn general_config(&self) -> Result<GeneralConfig, EngineError>;

    /// Apply the fields present in `patch`.
    fn patch_general_config(&self, patch: GeneralConfig) -> Result<(), EngineError>;

    /// Names of all configured remotes, sorted.
    fn list_remotes(&self) -> Result<Vec<String>, EngineError>;

    /// Configuration of one remote.
    fn remote_config(&self, name: &str) -> Result<RemoteConfig, EngineError>;

    /// Create a remote and return its stored configuration.
    fn create_remote(&self, name: &str, remote: NewRemote) -> Result<RemoteConfig, EngineError>;

    /// Merge `options` into an existing remote.
    fn update_remote(&self, name: &str, options: RemoteOptions) -> Result<(), EngineError>;

    /// Set a single option on an existing remote.
    fn set_option(&self, name: &str, key: &str, value: &str) -> Result<(), EngineError>;

    /// Duplicate `source` under the new name `destination`.
    fn copy_remote(&self, source: &str, destination: &str) -> Result<(), EngineError>;

    /// Remove a remote.
    fn delete_remote(&self, name: &str) -> Result<(), EngineError>;
}
