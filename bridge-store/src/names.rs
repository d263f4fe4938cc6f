//! Remote name and option key rules.

use portbridge_core::EngineError;

/// Option keys the store manages itself.
pub const RESERVED_OPTIONS: &[&str] = &["type", "name"];

/// Check that `name` is usable as a remote name.
///
/// Allowed: ASCII letters and digits, `_ - . + @` and space. A name must
/// not start with `-` or space, nor end with space.
pub fn validate_remote_name(name: &str) -> Result<(), EngineError> {
    let reject = |reason: String| EngineError::InvalidName {
        name: name.to_string(),
        reason,
    };

    if name.is_empty() {
        return Err(reject("must not be empty".to_string()));
    }
    if name.starts_with('-') || name.starts_with(' ') {
        return Err(reject("must not start with '-' or space".to_string()));
    }
    if name.ends_with(' ') {
        return Err(reject("must not end with space".to_string()));
    }
    if let Some(c) = name
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || "_-.+@ ".contains(*c)))
    {
        return Err(reject(format!("invalid character {:?}", c)));
    }
    Ok(())
}

/// Reject option keys the store manages itself.
pub fn check_option_key(key: &str) -> Result<(), EngineError> {
    if RESERVED_OPTIONS.contains(&key) {
        return Err(EngineError::ReservedOption(key.to_string()));
    }
    Ok(())
}
