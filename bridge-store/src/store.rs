//! The config store engine.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use portbridge_core::{Engine, EngineError};
use portbridge_types::{GeneralConfig, NewRemote, RemoteConfig, RemoteOptions};
use serde::{Deserialize, Serialize};

use crate::names::{check_option_key, validate_remote_name};
use crate::StoreError;

/// On-disk layout of the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct StoreDocument {
    #[serde(default = "default_general")]
    general: GeneralConfig,
    #[serde(default)]
    remotes: BTreeMap<String, StoredRemote>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct StoredRemote {
    #[serde(rename = "type")]
    kind: String,
    #[serde(flatten)]
    options: BTreeMap<String, String>,
}

impl StoredRemote {
    fn to_config(&self, name: &str) -> RemoteConfig {
        RemoteConfig {
            name: name.to_string(),
            kind: self.kind.clone(),
            options: self.options.clone(),
        }
    }
}

fn default_general() -> GeneralConfig {
    GeneralConfig {
        allow_lan: Some(true),
        bind_address: Some("0.0.0.0".to_string()),
        port: Some(8080),
        ..Default::default()
    }
}

impl Default for StoreDocument {
    fn default() -> Self {
        Self {
            general: default_general(),
            remotes: BTreeMap::new(),
        }
    }
}

/// Remote configuration store.
///
/// All state sits behind one lock, held across the file write, so
/// concurrent calls see mutations in a single order and the file always
/// matches some state the store was in.
#[derive(Debug)]
pub struct ConfigStore {
    path: Option<PathBuf>,
    state: Mutex<StoreDocument>,
}

impl ConfigStore {
    /// A store with default settings that never touches disk.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            state: Mutex::new(StoreDocument::default()),
        }
    }

    /// Open the store backed by `path`.
    ///
    /// A missing file yields the defaults; the file is created on the first
    /// mutation.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let document = match std::fs::read_to_string(&path) {
            Ok(content) => toml::from_str(&content).map_err(|e| StoreError::ParseError {
                path: path.clone(),
                source: e,
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("No store at {}, starting from defaults", path.display());
                StoreDocument::default()
            }
            Err(e) => {
                return Err(StoreError::ReadError {
                    path: path.clone(),
                    source: e,
                })
            }
        };

        tracing::debug!(
            "Opened store {} ({} remotes)",
            path.display(),
            document.remotes.len()
        );
        Ok(Self {
            path: Some(path),
            state: Mutex::new(document),
        })
    }

    /// Backing file, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn lock(&self) -> MutexGuard<'_, StoreDocument> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply `change` and persist the result.
    ///
    /// A failed write is reported, but the in-memory change stands.
    fn mutate<T>(
        &self,
        change: impl FnOnce(&mut StoreDocument) -> Result<T, EngineError>,
    ) -> Result<T, EngineError> {
        let mut document = self.lock();
        let value = change(&mut document)?;
        if let Some(path) = &self.path {
            save(path, &document)?;
        }
        Ok(value)
    }
}

fn save(path: &Path, document: &StoreDocument) -> Result<(), StoreError> {
    let content = toml::to_string_pretty(document)?;
    let tmp = path.with_extension("toml.tmp");
    let write_err = |source: std::io::Error| StoreError::WriteError {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(write_err)?;
    }
    std::fs::write(&tmp, content).map_err(write_err)?;
    std::fs::rename(&tmp, path).map_err(write_err)?;
    tracing::debug!("Saved store to {}", path.display());
    Ok(())
}

fn existing<'a>(
    document: &'a mut StoreDocument,
    name: &str,
) -> Result<&'a mut StoredRemote, EngineError> {
    document
        .remotes
        .get_mut(name)
        .ok_or_else(|| EngineError::RemoteNotFound(name.to_string()))
}

impl Engine for ConfigStore {
    fn general_config(&self) -> Result<GeneralConfig, EngineError> {
        Ok(self.lock().general.clone())
    }

    fn patch_general_config(&self, patch: GeneralConfig) -> Result<(), EngineError> {
        self.mutate(|doc| {
            doc.general.merge(patch);
            Ok(())
        })
    }

    fn list_remotes(&self) -> Result<Vec<String>, EngineError> {
        Ok(self.lock().remotes.keys().cloned().collect())
    }

    fn remote_config(&self, name: &str) -> Result<RemoteConfig, EngineError> {
        self.lock()
            .remotes
            .get(name)
            .map(|remote| remote.to_config(name))
            .ok_or_else(|| EngineError::RemoteNotFound(name.to_string()))
    }

    fn create_remote(&self, name: &str, remote: NewRemote) -> Result<RemoteConfig, EngineError> {
        validate_remote_name(name)?;
        for key in remote.options.keys() {
            check_option_key(key)?;
        }

        self.mutate(|doc| {
            if doc.remotes.contains_key(name) {
                return Err(EngineError::RemoteExists(name.to_string()));
            }
            let stored = StoredRemote {
                kind: remote.kind,
                options: remote
                    .options
                    .into_iter()
                    .map(|(k, v)| (k, v.into_text()))
                    .collect(),
            };
            let config = stored.to_config(name);
            doc.remotes.insert(name.to_string(), stored);
            tracing::info!("Created remote {} ({})", name, config.kind);
            Ok(config)
        })
    }

    fn update_remote(&self, name: &str, options: RemoteOptions) -> Result<(), EngineError> {
        for key in options.keys() {
            check_option_key(key)?;
        }

        self.mutate(|doc| {
            let remote = existing(doc, name)?;
            for (key, value) in options {
                remote.options.insert(key, value.into_text());
            }
            Ok(())
        })
    }

    fn set_option(&self, name: &str, key: &str, value: &str) -> Result<(), EngineError> {
        check_option_key(key)?;
        self.mutate(|doc| {
            existing(doc, name)?
                .options
                .insert(key.to_string(), value.to_string());
            Ok(())
        })
    }

    fn copy_remote(&self, source: &str, destination: &str) -> Result<(), EngineError> {
        validate_remote_name(destination)?;
        self.mutate(|doc| {
            if doc.remotes.contains_key(destination) {
                return Err(EngineError::RemoteExists(destination.to_string()));
            }
            let copy = doc
                .remotes
                .get(source)
                .cloned()
                .ok_or_else(|| EngineError::RemoteNotFound(source.to_string()))?;
            doc.remotes.insert(destination.to_string(), copy);
            tracing::info!("Copied remote {} to {}", source, destination);
            Ok(())
        })
    }

    fn delete_remote(&self, name: &str) -> Result<(), EngineError> {
        self.mutate(|doc| {
            doc.remotes
                .remove(name)
                .ok_or_else(|| EngineError::RemoteNotFound(name.to_string()))?;
            tracing::info!("Deleted remote {}", name);
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use portbridge_types::{LogLevel, OptionValue};
    use tempfile::tempdir;

    fn new_remote(kind: &str, options: &[(&str, &str)]) -> NewRemote {
        NewRemote {
            kind: kind.to_string(),
            options: options
                .iter()
                .map(|(k, v)| (k.to_string(), OptionValue::from(*v)))
                .collect(),
        }
    }

    #[test]
    fn defaults_match_stock_settings() {
        let store = ConfigStore::in_memory();
        let general = store.general_config().unwrap();
        assert_eq!(
            serde_json::to_string(&general).unwrap(),
            r#"{"allowLan":true,"bindAddress":"0.0.0.0","port":8080}"#
        );
        assert!(store.list_remotes().unwrap().is_empty());
    }

    #[test]
    fn create_get_and_list() {
        let store = ConfigStore::in_memory();
        let created = store
            .create_remote("s3box", new_remote("s3", &[("region", "eu")]))
            .unwrap();
        assert_eq!(created.name, "s3box");
        assert_eq!(store.remote_config("s3box").unwrap(), created);
        assert_eq!(store.list_remotes().unwrap(), vec!["s3box"]);
    }

    #[test]
    fn create_twice_fails() {
        let store = ConfigStore::in_memory();
        store.create_remote("a", new_remote("s3", &[])).unwrap();
        let err = store.create_remote("a", new_remote("s3", &[])).unwrap_err();
        assert!(matches!(err, EngineError::RemoteExists(_)));
    }

    #[test]
    fn create_rejects_bad_name_and_reserved_option() {
        let store = ConfigStore::in_memory();
        assert!(matches!(
            store.create_remote("a/b", new_remote("s3", &[])),
            Err(EngineError::InvalidName { .. })
        ));
        assert!(matches!(
            store.create_remote("a", new_remote("s3", &[("name", "x")])),
            Err(EngineError::ReservedOption(_))
        ));
        assert!(store.list_remotes().unwrap().is_empty());
    }

    #[test]
    fn update_merges_options() {
        let store = ConfigStore::in_memory();
        store
            .create_remote("a", new_remote("s3", &[("region", "eu"), ("acl", "private")]))
            .unwrap();

        let mut options = RemoteOptions::new();
        options.insert("region".to_string(), OptionValue::from("us"));
        options.insert("chunk".to_string(), OptionValue::Number(8.into()));
        store.update_remote("a", options).unwrap();

        let remote = store.remote_config("a").unwrap();
        assert_eq!(remote.options["region"], "us");
        assert_eq!(remote.options["acl"], "private");
        assert_eq!(remote.options["chunk"], "8");
    }

    #[test]
    fn update_missing_remote_fails() {
        let store = ConfigStore::in_memory();
        let err = store.update_remote("ghost", RemoteOptions::new()).unwrap_err();
        assert_eq!(err.to_string(), "remote not found: ghost");
    }

    #[test]
    fn set_option_refuses_type() {
        let store = ConfigStore::in_memory();
        store.create_remote("a", new_remote("s3", &[])).unwrap();
        assert!(matches!(
            store.set_option("a", "type", "drive"),
            Err(EngineError::ReservedOption(_))
        ));
        assert_eq!(store.remote_config("a").unwrap().kind, "s3");
    }

    #[test]
    fn copy_duplicates_under_new_name() {
        let store = ConfigStore::in_memory();
        store.create_remote("a", new_remote("s3", &[("region", "eu")])).unwrap();
        store.copy_remote("a", "b").unwrap();

        let copy = store.remote_config("b").unwrap();
        assert_eq!(copy.name, "b");
        assert_eq!(copy.options["region"], "eu");
        assert!(matches!(
            store.copy_remote("a", "b"),
            Err(EngineError::RemoteExists(_))
        ));
        assert!(matches!(
            store.copy_remote("ghost", "c"),
            Err(EngineError::RemoteNotFound(_))
        ));
    }

    #[test]
    fn delete_removes_remote() {
        let store = ConfigStore::in_memory();
        store.create_remote("a", new_remote("s3", &[])).unwrap();
        store.delete_remote("a").unwrap();
        assert!(matches!(
            store.delete_remote("a"),
            Err(EngineError::RemoteNotFound(_))
        ));
    }

    #[test]
    fn state_survives_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.toml");

        {
            let store = ConfigStore::open(&path).unwrap();
            store
                .create_remote("s3box", new_remote("s3", &[("region", "eu")]))
                .unwrap();
            store
                .patch_general_config(GeneralConfig {
                    log_level: Some(LogLevel::Warning),
                    port: Some(9090),
                    ..Default::default()
                })
                .unwrap();
        }

        let reopened = ConfigStore::open(&path).unwrap();
        assert_eq!(reopened.remote_config("s3box").unwrap().options["region"], "eu");
        let general = reopened.general_config().unwrap();
        assert_eq!(general.port, Some(9090));
        assert_eq!(general.log_level, Some(LogLevel::Warning));
        assert_eq!(general.allow_lan, Some(true));
        assert!(!dir.path().join("store.toml.tmp").exists());
    }

    #[test]
    fn missing_file_is_not_created_until_mutation() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("store.toml");
        let store = ConfigStore::open(&path).unwrap();
        store.general_config().unwrap();
        assert!(!path.exists());

        store.create_remote("a", new_remote("local", &[])).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn reads_hand_written_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.toml");
        std::fs::write(
            &path,
            r#"
[general]
allowLan = false
mixedPort = 7890

[remotes.gdrive]
type = "drive"
scope = "drive.readonly"
"#,
        )
        .unwrap();

        let store = ConfigStore::open(&path).unwrap();
        let general = store.general_config().unwrap();
        assert_eq!(general.allow_lan, Some(false));
        assert_eq!(general.mixed_port, Some(7890));
        assert_eq!(general.port, None);

        let remote = store.remote_config("gdrive").unwrap();
        assert_eq!(remote.kind, "drive");
        assert_eq!(remote.options["scope"], "drive.readonly");
    }

    #[test]
    fn file_without_general_uses_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.toml");
        std::fs::write(&path, "[remotes.a]\ntype = \"s3\"\n").unwrap();

        let store = ConfigStore::open(&path).unwrap();
        assert_eq!(store.general_config().unwrap().port, Some(8080));
    }

    #[test]
    fn corrupt_file_is_a_parse_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.toml");
        std::fs::write(&path, "[general\n").unwrap();
        assert!(matches!(
            ConfigStore::open(&path),
            Err(StoreError::ParseError { .. })
        ));
    }

    #[test]
    fn failed_write_reports_but_keeps_change() {
        let dir = tempdir().unwrap();
        // The store path is a directory, so the final rename cannot succeed.
        let path = dir.path().join("occupied");
        std::fs::create_dir(&path).unwrap();
        std::fs::write(path.join("keep"), "x").unwrap();

        let store = ConfigStore {
            path: Some(path),
            state: Mutex::new(StoreDocument::default()),
        };
        let err = store.create_remote("a", new_remote("s3", &[])).unwrap_err();
        assert!(matches!(err, EngineError::Persistence(_)));
        assert_eq!(store.list_remotes().unwrap(), vec!["a"]);
    }
}
