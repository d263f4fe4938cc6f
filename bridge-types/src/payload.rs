//! Schema-bound payloads carried as JSON strings across the boundary.
//!
//! Dart passes structured input as a JSON string argument and receives
//! structured output in the envelope's `data` field. Each operation reads
//! and writes one of the types below, so a malformed payload fails at decode
//! instead of inside the engine.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Engine log verbosity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Everything, including per-call tracing.
    Debug,
    /// Normal operation.
    Info,
    /// Recoverable problems.
    Warning,
    /// Failures only.
    Error,
    /// Nothing.
    Silent,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warning => "warning",
            LogLevel::Error => "error",
            LogLevel::Silent => "silent",
        };
        f.write_str(name)
    }
}

/// General engine settings.
///
/// Every field is optional: the same type is the full settings document
/// returned by `getGeneralConfig` and the partial patch accepted by
/// `patchGeneralConfig`. Absent fields are left out of the JSON.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneralConfig {
    /// Accept connections from other hosts on the LAN.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_lan: Option<bool>,
    /// Listen address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bind_address: Option<String>,
    /// Log verbosity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_level: Option<LogLevel>,
    /// HTTP port.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    /// SOCKS port.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub socks_port: Option<u16>,
    /// Mixed HTTP/SOCKS port.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mixed_port: Option<u16>,
    /// Redirect port.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redir_port: Option<u16>,
    /// Transparent proxy port.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tproxy_port: Option<u16>,
}

impl GeneralConfig {
    /// Apply every field present in `patch`, leaving the others untouched.
    pub fn merge(&mut self, patch: GeneralConfig) {
        fn take<T>(slot: &mut Option<T>, value: Option<T>) {
            if value.is_some() {
                *slot = value;
            }
        }

        take(&mut self.allow_lan, patch.allow_lan);
        take(&mut self.bind_address, patch.bind_address);
        take(&mut self.log_level, patch.log_level);
        take(&mut self.port, patch.port);
        take(&mut self.socks_port, patch.socks_port);
        take(&mut self.mixed_port, patch.mixed_port);
        take(&mut self.redir_port, patch.redir_port);
        take(&mut self.tproxy_port, patch.tproxy_port);
    }

    /// Whether the patch would change nothing.
    pub fn is_empty(&self) -> bool {
        *self == GeneralConfig::default()
    }
}

/// A single option value as Dart sends it.
///
/// Remote options are stored as text, but clients may send JSON booleans
/// and numbers. Numbers keep their JSON spelling, so `u64` values and
/// exponents survive unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    /// A string value.
    Text(String),
    /// A boolean value.
    Flag(bool),
    /// A numeric value.
    Number(serde_json::Number),
}

impl OptionValue {
    /// The stored text form of this value.
    pub fn into_text(self) -> String {
        match self {
            OptionValue::Text(s) => s,
            OptionValue::Flag(b) => b.to_string(),
            OptionValue::Number(n) => n.to_string(),
        }
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        OptionValue::Text(value.to_string())
    }
}

/// Option updates for one remote, keyed by option name.
pub type RemoteOptions = BTreeMap<String, OptionValue>;

/// Input of `createRemote`: the backend type plus its initial options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewRemote {
    /// Backend type, e.g. `s3` or `drive`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Initial options.
    #[serde(flatten)]
    pub options: RemoteOptions,
}

/// A configured remote as returned to Dart.
///
/// Serializes flat: `{"name":"s3box","type":"s3","region":"eu-west-1"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Remote name.
    pub name: String,
    /// Backend type.
    #[serde(rename = "type")]
    pub kind: String,
    /// Backend options, stored as text.
    #[serde(flatten)]
    pub options: BTreeMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn general_config_omits_absent_fields() {
        let config = GeneralConfig {
            allow_lan: Some(true),
            bind_address: Some("0.0.0.0".to_string()),
            port: Some(8080),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_string(&config).unwrap(),
            r#"{"allowLan":true,"bindAddress":"0.0.0.0","port":8080}"#
        );
    }

    #[test]
    fn general_config_uses_camel_case_keys() {
        let patch: GeneralConfig =
            serde_json::from_str(r#"{"tproxyPort":7895,"logLevel":"warning","mixedPort":7890}"#)
                .unwrap();
        assert_eq!(patch.tproxy_port, Some(7895));
        assert_eq!(patch.mixed_port, Some(7890));
        assert_eq!(patch.log_level, Some(LogLevel::Warning));
    }

    #[test]
    fn general_config_rejects_out_of_range_port() {
        assert!(serde_json::from_str::<GeneralConfig>(r#"{"port":70000}"#).is_err());
    }

    #[test]
    fn general_config_rejects_unknown_log_level() {
        assert!(serde_json::from_str::<GeneralConfig>(r#"{"logLevel":"loud"}"#).is_err());
    }

    #[test]
    fn merge_applies_only_present_fields() {
        let mut config = GeneralConfig {
            allow_lan: Some(true),
            port: Some(8080),
            ..Default::default()
        };
        config.merge(GeneralConfig {
            port: Some(9090),
            log_level: Some(LogLevel::Debug),
            ..Default::default()
        });
        assert_eq!(config.allow_lan, Some(true));
        assert_eq!(config.port, Some(9090));
        assert_eq!(config.log_level, Some(LogLevel::Debug));
    }

    #[test]
    fn empty_patch_is_empty() {
        let patch: GeneralConfig = serde_json::from_str("{}").unwrap();
        assert!(patch.is_empty());
    }

    #[test]
    fn option_values_accept_json_scalars() {
        let options: RemoteOptions =
            serde_json::from_str(r#"{"region":"eu","chunk":5,"ratio":0.5,"secure":true}"#)
                .unwrap();
        let text: BTreeMap<_, _> = options
            .into_iter()
            .map(|(k, v)| (k, v.into_text()))
            .collect();
        assert_eq!(text["region"], "eu");
        assert_eq!(text["chunk"], "5");
        assert_eq!(text["ratio"], "0.5");
        assert_eq!(text["secure"], "true");
    }

    #[test]
    fn large_numbers_keep_their_spelling() {
        let remote: NewRemote = serde_json::from_str(
            r#"{"type":"s3","max":18446744073709551615,"min":-9223372036854775808,"big":1e21}"#,
        )
        .unwrap();
        let text: BTreeMap<String, String> = remote
            .options
            .into_iter()
            .map(|(k, v)| (k, v.into_text()))
            .collect();
        assert_eq!(text["max"], "18446744073709551615");
        assert_eq!(text["min"], "-9223372036854775808");
        assert_eq!(text["big"], "1e21");
    }

    #[test]
    fn option_values_reject_nested_objects() {
        assert!(serde_json::from_str::<RemoteOptions>(r#"{"nested":{"a":1}}"#).is_err());
    }

    #[test]
    fn new_remote_splits_type_from_options() {
        let remote: NewRemote =
            serde_json::from_str(r#"{"type":"s3","url":"https://example.com"}"#).unwrap();
        assert_eq!(remote.kind, "s3");
        assert_eq!(remote.options["url"], OptionValue::from("https://example.com"));
        assert!(!remote.options.contains_key("type"));
    }

    #[test]
    fn new_remote_requires_type() {
        assert!(serde_json::from_str::<NewRemote>(r#"{"url":"x"}"#).is_err());
    }

    #[test]
    fn remote_config_serializes_flat() {
        let mut options = BTreeMap::new();
        options.insert("url".to_string(), "https://example.com".to_string());
        let remote = RemoteConfig {
            name: "s3box".to_string(),
            kind: "s3".to_string(),
            options,
        };
        assert_eq!(
            serde_json::to_string(&remote).unwrap(),
            r#"{"name":"s3box","type":"s3","url":"https://example.com"}"#
        );
    }
}
