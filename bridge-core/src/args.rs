//! Call arguments as they arrive from the boundary.

use serde::de::DeserializeOwned;

use crate::BridgeError;

/// Positional string arguments of one call, token excluded.
///
/// Each value is read according to the operation's declared
/// [`Param`](crate::Param) list. Null C strings arrive here as empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallArgs(Vec<String>);

impl CallArgs {
    /// Wrap positional arguments.
    pub fn new(values: Vec<String>) -> Self {
        Self(values)
    }

    /// No arguments.
    pub fn none() -> Self {
        Self::default()
    }

    /// Number of arguments supplied.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no arguments were supplied.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Raw text of argument `index`; missing arguments read as empty.
    pub fn text(&self, index: usize) -> &str {
        self.0.get(index).map(String::as_str).unwrap_or("")
    }

    /// Decode argument `index` as a JSON document.
    pub fn json<T: DeserializeOwned>(&self, index: usize) -> Result<T, BridgeError> {
        serde_json::from_str(self.text(index)).map_err(BridgeError::Decode)
    }
}

impl From<Vec<String>> for CallArgs {
    fn from(values: Vec<String>) -> Self {
        Self(values)
    }
}

impl<S: Into<String>> FromIterator<S> for CallArgs {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}
