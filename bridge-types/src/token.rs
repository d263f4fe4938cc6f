//! Call token: the response endpoint a single call writes to.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies one pending response endpoint on the client side.
///
/// On the Dart side this is `ReceivePort.sendPort.nativePort`. The bridge
/// carries it opaquely and never reuses or validates it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CallToken(i64);

impl CallToken {
    /// Wrap a raw port number.
    pub const fn new(port: i64) -> Self {
        Self(port)
    }

    /// Get the raw port number.
    pub const fn port(self) -> i64 {
        self.0
    }
}

impl From<i64> for CallToken {
    fn from(port: i64) -> Self {
        Self(port)
    }
}

impl fmt::Display for CallToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
