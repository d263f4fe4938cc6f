//! Port response channel.
//!
//! Delivers one envelope to the endpoint named by a call token. The actual
//! crossing into the client runtime is a [`PortSink`]; the Dart sink lives
//! in `bridge-dart`, [`MockPortSink`] records deliveries for tests.
//!
//! # Design
//!
//! Sends are fire-and-forget:
//! - no acknowledgement and no retry
//! - a post the sink refuses (dead port, bridge not initialized) is logged
//!   and dropped; it never produces a second response
//! - callable from any thread, including blocking-pool workers

mod mock;

pub use mock::MockPortSink;

use std::sync::Arc;

use portbridge_types::{CallToken, ResponseEnvelope};

/// Sent when an envelope cannot be encoded. Kept as a literal so the
/// fallback itself cannot fail.
const ENCODE_FAILURE: &str = r#"{"success":false,"message":"failed to encode response","data":""}"#;

/// The cross-runtime post primitive.
///
/// Implementations hand `message` to whatever listens on `token`.
pub trait PortSink: Send + Sync {
    /// Post `message` to `token`. Returns whether the runtime accepted it.
    fn post(&self, token: CallToken, message: String) -> bool;
}

/// Sends response envelopes through a [`PortSink`].
#[derive(Clone)]
pub struct ResponseChannel {
    sink: Arc<dyn PortSink>,
}

impl ResponseChannel {
    /// Create a channel over the given sink.
    pub fn new(sink: Arc<dyn PortSink>) -> Self {
        Self { sink }
    }

    /// Encode `envelope` and post it to `token`.
    pub fn send(&self, token: CallToken, envelope: &ResponseEnvelope) {
        let wire = match envelope.to_json() {
            Ok(wire) => wire,
            Err(e) => {
                tracing::error!("Failed to encode envelope for port {}: {}", token, e);
                ENCODE_FAILURE.to_string()
            }
        };

        if !self.sink.post(token, wire) {
            tracing::warn!("Port {} did not accept the response", token);
        }
    }
}

impl std::fmt::Debug for ResponseChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseChannel").finish_non_exhaustive()
    }
}
