//! Dispatcher: turns one boundary call into one port response.
//!
//! [`Dispatcher::dispatch`] returns as soon as the work is queued on the
//! runtime's blocking pool; the worker runs the operation and responds.
//! Without a runtime the call runs inline, which is what the CLI and most
//! tests use.

use std::sync::Arc;

use portbridge_types::CallToken;
use tokio::runtime::Handle;

use crate::{CallArgs, Engine, OperationRegistry, Responder, ResponseChannel};

/// Routes calls by operation name and answers each on its token.
#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<OperationRegistry>,
    engine: Arc<dyn Engine>,
    channel: ResponseChannel,
    runtime: Option<Handle>,
}

impl Dispatcher {
    /// Create a dispatcher that runs calls inline.
    pub fn new(
        registry: Arc<OperationRegistry>,
        engine: Arc<dyn Engine>,
        channel: ResponseChannel,
    ) -> Self {
        Self {
            registry,
            engine,
            channel,
            runtime: None,
        }
    }

    /// Run dispatched calls on `runtime`'s blocking pool.
    pub fn with_runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    /// The registered operations.
    pub fn registry(&self) -> &OperationRegistry {
        &self.registry
    }

    /// Queue a call and return immediately.
    ///
    /// Exactly one envelope reaches `token` later, from the worker. With no
    /// runtime configured this behaves like [`execute`](Self::execute).
    pub fn dispatch(&self, operation: &str, token: CallToken, args: CallArgs) {
        let Some(runtime) = self.runtime.clone() else {
            self.execute(operation, token, args);
            return;
        };

        let responder = Responder::new(token, self.channel.clone());
        let registry = Arc::clone(&self.registry);
        let engine = Arc::clone(&self.engine);
        let operation = operation.to_string();

        tracing::debug!("Queueing {} for port {}", operation, token);
        // If the runtime is shutting down the closure is dropped unrun, and
        // the responder's drop answers the token.
        drop(runtime.spawn_blocking(move || {
            let outcome = registry.execute(&operation, engine.as_ref(), &args);
            responder.respond(outcome);
        }));
    }

    /// Run a call on the current thread and respond before returning.
    pub fn execute(&self, operation: &str, token: CallToken, args: CallArgs) {
        let responder = Responder::new(token, self.channel.clone());
        tracing::debug!("Running {} for port {}", operation, token);
        let outcome = self
            .registry
            .execute(operation, self.engine.as_ref(), &args);
        responder.respond(outcome);
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("operations", &self.registry.len())
            .field("threaded", &self.runtime.is_some())
            .finish()
    }
}
