//! Mock engine for testing.
//!
//! Keeps state in memory, records every call and can be told to fail the
//! next one.

use super::Engine;
use crate::EngineError;
use portbridge_types::{GeneralConfig, NewRemote, RemoteConfig, RemoteOptions};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// Mock engine for testing.
#[derive(Debug, Clone)]
pub struct MockEngine {
    inner: Arc<Mutex<MockEngineInner>>,
}

#[derive(Debug, Default)]
struct MockEngineInner {
    general: GeneralConfig,
    remotes: BTreeMap<String, RemoteConfig>,
    calls: Vec<&'static str>,
    fail_next: Option<String>,
}

impl Default for MockEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl MockEngine {
    /// Create a mock engine with the stock general settings and no remotes.
    pub fn new() -> Self {
        let general = GeneralConfig {
            allow_lan: Some(true),
            bind_address: Some("0.0.0.0".to_string()),
            port: Some(8080),
            ..Default::default()
        };
        Self {
            inner: Arc::new(Mutex::new(MockEngineInner {
                general,
                ..Default::default()
            })),
        }
    }

    /// Seed a remote without recording a call.
    pub fn with_remote(self, name: &str, kind: &str, options: &[(&str, &str)]) -> Self {
        let remote = RemoteConfig {
            name: name.to_string(),
            kind: kind.to_string(),
            options: options
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        };
        self.inner
            .lock()
            .unwrap()
            .remotes
            .insert(name.to_string(), remote);
        self
    }

    /// Names of the engine methods called so far, in order.
    pub fn calls(&self) -> Vec<&'static str> {
        self.inner.lock().unwrap().calls.clone()
    }

    /// Cause the next call to fail with a backend error.
    pub fn fail_next(&self, error: &str) {
        self.inner.lock().unwrap().fail_next = Some(error.to_string());
    }

    fn enter(&self, call: &'static str) -> Result<MutexGuard<'_, MockEngineInner>, EngineError> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(call);
        if let Some(error) = inner.fail_next.take() {
            return Err(EngineError::Backend(error));
        }
        Ok(inner)
    }
}

impl Engine for MockEngine {
    fn general_config(&self) -> Result<GeneralConfig, EngineError> {
        Ok(self.enter("general_config")?.general.clone())
    }

    fn patch_general_config(&self, patch: GeneralConfig) -> Result<(), EngineError> {
        self.enter("patch_general_config")?.general.merge(patch);
        Ok(())
    }

    fn list_remotes(&self) -> Result<Vec<String>, EngineError> {
        Ok(self.enter("list_remotes")?.remotes.keys().cloned().collect())
    }

    fn remote_config(&self, name: &str) -> Result<RemoteConfig, EngineError> {
        self.enter("remote_config")?
            .remotes
            .get(name)
            .cloned()
            .ok_or_else(|| EngineError::RemoteNotFound(name.to_string()))
    }

    fn create_remote(&self, name: &str, remote: NewRemote) -> Result<RemoteConfig, EngineError> {
        let mut inner = self.enter("create_remote")?;
        if inner.remotes.contains_key(name) {
            return Err(EngineError::RemoteExists(name.to_string()));
        }
        let config = RemoteConfig {
            name: name.to_string(),
            kind: remote.kind,
            options: remote
                .options
                .into_iter()
                .map(|(k, v)| (k, v.into_text()))
                .collect(),
        };
        inner.remotes.insert(name.to_string(), config.clone());
        Ok(config)
    }

    fn update_remote(&self, name: &str, options: RemoteOptions) -> Result<(), EngineError> {
        let mut inner = self.enter("update_remote")?;
        let remote = inner
            .remotes
            .get_mut(name)
            .ok_or_else(|| EngineError::RemoteNotFound(name.to_string()))?;
        for (key, value) in options {
            remote.options.insert(key, value.into_text());
        }
        Ok(())
    }

    fn set_option(&self, name: &str, key: &str, value: &str) -> Result<(), EngineError> {
        let mut inner = self.enter("set_option")?;
        let remote = inner
            .remotes
            .get_mut(name)
            .ok_or_else(|| EngineError::RemoteNotFound(name.to_string()))?;
        remote.options.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn copy_remote(&self, source: &str, destination: &str) -> Result<(), EngineError> {
        let mut inner = self.enter("copy_remote")?;
        if inner.remotes.contains_key(destination) {
            return Err(EngineError::RemoteExists(destination.to_string()));
        }
        let mut copy = inner
            .remotes
            .get(source)
            .cloned()
            .ok_or_else(|| EngineError::RemoteNotFound(source.to_string()))?;
        copy.name = destination.to_string();
        inner.remotes.insert(destination.to_string(), copy);
        Ok(())
    }

    fn delete_remote(&self, name: &str) -> Result<(), EngineError> {
        self.enter("delete_remote")?
            .remotes
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| EngineError::RemoteNotFound(name.to_string()))
    }
}
