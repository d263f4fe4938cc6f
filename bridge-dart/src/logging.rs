//! Tracing subscriber setup and runtime log level changes.
//!
//! The filter sits behind a reload layer so a `logLevel` patch from Dart
//! takes effect without restarting the host.

use std::sync::{Arc, OnceLock};

use portbridge_core::{Engine, EngineError};
use portbridge_types::{GeneralConfig, LogLevel, NewRemote, RemoteConfig, RemoteOptions};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, reload, EnvFilter, Registry};

static FILTER: OnceLock<reload::Handle<EnvFilter, Registry>> = OnceLock::new();

/// Install a stderr `fmt` subscriber.
///
/// `RUST_LOG` wins over `default_filter`. A subscriber the host already
/// installed is left alone, and level changes are then not applied.
pub fn init(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let (filter, handle) = reload::Layer::new(filter);
    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .try_init();
    if installed.is_ok() {
        let _ = FILTER.set(handle);
    }
}

/// Filter directive for a general-config log level.
pub fn directive(level: LogLevel) -> &'static str {
    match level {
        LogLevel::Debug => "debug",
        LogLevel::Info => "info",
        LogLevel::Warning => "warn",
        LogLevel::Error => "error",
        LogLevel::Silent => "off",
    }
}

/// Swap the active filter for `level`. Returns whether it was applied.
pub fn apply_level(level: LogLevel) -> bool {
    let Some(handle) = FILTER.get() else {
        return false;
    };
    match handle.reload(EnvFilter::new(directive(level))) {
        Ok(()) => {
            tracing::info!("Log level set to {}", level);
            true
        }
        Err(e) => {
            tracing::warn!("Failed to apply log level {}: {}", level, e);
            false
        }
    }
}

/// The active filter, if this module installed the subscriber.
pub fn current_filter() -> Option<String> {
    FILTER.get()?.with_current(|f| f.to_string()).ok()
}

type LevelHook = Box<dyn Fn(LogLevel) + Send + Sync>;

/// Engine wrapper that passes patched log levels to a hook.
///
/// The hook runs only after the inner engine accepted the patch.
pub struct LevelSync {
    inner: Arc<dyn Engine>,
    on_level: LevelHook,
}

impl LevelSync {
    /// Wrap `inner`, calling `on_level` for every accepted `logLevel`.
    pub fn new(inner: Arc<dyn Engine>, on_level: impl Fn(LogLevel) + Send + Sync + 'static) -> Self {
        Self {
            inner,
            on_level: Box::new(on_level),
        }
    }
}

impl Engine for LevelSync {
    fn general_config(&self) -> Result<GeneralConfig, EngineError> {
        self.inner.general_config()
    }

    fn patch_general_config(&self, patch: GeneralConfig) -> Result<(), EngineError> {
        let level = patch.log_level;
        self.inner.patch_general_config(patch)?;
        if let Some(level) = level {
            (self.on_level)(level);
        }
        Ok(())
    }

    fn list_remotes(&self) -> Result<Vec<String>, EngineError> {
        self.inner.list_remotes()
    }

    fn remote_config(&self, name: &str) -> Result<RemoteConfig, EngineError> {
        self.inner.remote_config(name)
    }

    fn create_remote(&self, name: &str, remote: NewRemote) -> Result<RemoteConfig, EngineError> {
        self.inner.create_remote(name, remote)
    }

    fn update_remote(&self, name: &str, options: RemoteOptions) -> Result<(), EngineError> {
        self.inner.update_remote(name, options)
    }

    fn set_option(&self, name: &str, key: &str, value: &str) -> Result<(), EngineError> {
        self.inner.set_option(name, key, value)
    }

    fn copy_remote(&self, source: &str, destination: &str) -> Result<(), EngineError> {
        self.inner.copy_remote(source, destination)
    }

    fn delete_remote(&self, name: &str) -> Result<(), EngineError> {
        self.inner.delete_remote(name)
    }
}
