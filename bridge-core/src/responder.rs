//! Single-shot completion for one call token.

use portbridge_types::{CallToken, Outcome};

use crate::ResponseChannel;

/// Sent when a responder is dropped before anyone responded.
pub const NO_RESPONSE: &str = "operation finished without a response";

/// The one response a call owes its token.
///
/// [`respond`](Responder::respond) consumes the responder, so a second send
/// for the same call does not compile. A responder dropped without
/// responding (a handler that returned early, a worker that never ran)
/// sends a failure instead, so the client is never left waiting.
#[derive(Debug)]
pub struct Responder {
    token: CallToken,
    channel: ResponseChannel,
    delivered: bool,
}

impl Responder {
    /// Bind a responder to `token`.
    pub fn new(token: CallToken, channel: ResponseChannel) -> Self {
        Self {
            token,
            channel,
            delivered: false,
        }
    }

    /// The token this responder answers.
    pub fn token(&self) -> CallToken {
        self.token
    }

    /// Deliver the call's outcome.
    pub fn respond(mut self, outcome: Outcome) {
        self.deliver(outcome);
    }

    fn deliver(&mut self, outcome: Outcome) {
        if self.delivered {
            return;
        }
        self.delivered = true;
        self.channel.send(self.token, &outcome.into());
    }
}

impl Drop for Responder {
    fn drop(&mut self) {
        if !self.delivered {
            tracing::error!("Call on port {} ended without a response", self.token);
            self.deliver(Outcome::failure(NO_RESPONSE));
        }
    }
}
