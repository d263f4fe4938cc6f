//! Port sink that keeps posted envelopes for printing.

use std::sync::Mutex;

use portbridge_core::PortSink;
use portbridge_types::CallToken;

/// Collects every post in order.
#[derive(Debug, Default)]
pub struct CaptureSink {
    posted: Mutex<Vec<(CallToken, String)>>,
}

impl CaptureSink {
    /// Take everything posted so far.
    pub fn take(&self) -> Vec<(CallToken, String)> {
        match self.posted.lock() {
            Ok(mut posted) => std::mem::take(&mut *posted),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }
}

impl PortSink for CaptureSink {
    fn post(&self, token: CallToken, message: String) -> bool {
        match self.posted.lock() {
            Ok(mut posted) => posted.push((token, message)),
            Err(poisoned) => poisoned.into_inner().push((token, message)),
        }
        true
    }
}
