//! Mock port sink for testing.
//!
//! Captures every post and lets tests wait for deliveries made on worker
//! threads.

use super::PortSink;
use portbridge_types::{CallToken, ResponseEnvelope};
use std::sync::{Arc, Condvar, Mutex};
use std::time::{Duration, Instant};

/// Mock port sink for testing.
///
/// Clones share state, so a test can keep one handle and give another to
/// the channel.
#[derive(Debug, Default, Clone)]
pub struct MockPortSink {
    inner: Arc<Shared>,
}

#[derive(Debug, Default)]
struct Shared {
    state: Mutex<MockSinkInner>,
    posted: Condvar,
}

#[derive(Debug, Default)]
struct MockSinkInner {
    deliveries: Vec<(CallToken, String)>,
    reject_next: bool,
    rejected: usize,
}

impl MockPortSink {
    /// Create a new mock sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every post so far, in order, including rejected ones.
    pub fn deliveries(&self) -> Vec<(CallToken, String)> {
        self.inner.state.lock().unwrap().deliveries.clone()
    }

    /// Decoded envelopes posted to `token`, in order.
    pub fn envelopes_for(&self, token: CallToken) -> Vec<ResponseEnvelope> {
        self.inner
            .state
            .lock()
            .unwrap()
            .deliveries
            .iter()
            .filter(|(t, _)| *t == token)
            .map(|(_, wire)| ResponseEnvelope::from_json(wire).unwrap())
            .collect()
    }

    /// The single envelope posted to `token`.
    ///
    /// Panics unless exactly one envelope was posted there.
    pub fn only_envelope(&self, token: CallToken) -> ResponseEnvelope {
        let mut envelopes = self.envelopes_for(token);
        assert_eq!(
            envelopes.len(),
            1,
            "expected exactly one response on port {}",
            token
        );
        envelopes.remove(0)
    }

    /// Cause the next post to report rejection (as a closed port does).
    pub fn reject_next(&self) {
        self.inner.state.lock().unwrap().reject_next = true;
    }

    /// How many posts were rejected.
    pub fn rejected_count(&self) -> usize {
        self.inner.state.lock().unwrap().rejected
    }

    /// Block until at least `count` posts arrived or `timeout` passed.
    ///
    /// Returns whether the count was reached.
    pub fn wait_for_deliveries(&self, count: usize, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut state = self.inner.state.lock().unwrap();
        while state.deliveries.len() < count {
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            state = self.inner.posted.wait_timeout(state, deadline - now).unwrap().0;
        }
        true
    }

    /// Clear all recorded state.
    pub fn reset(&self) {
        *self.inner.state.lock().unwrap() = MockSinkInner::default();
    }
}

impl PortSink for MockPortSink {
    fn post(&self, token: CallToken, message: String) -> bool {
        let mut state = self.inner.state.lock().unwrap();
        state.deliveries.push((token, message));
        let accepted = !std::mem::take(&mut state.reject_next);
        if !accepted {
            state.rejected += 1;
        }
        self.inner.posted.notify_all();
        accepted
    }
}
