//! Process-wide bridge state.
//!
//! The exported symbols carry no context, so the dispatcher lives in a
//! static that `initNativeDartBridge` fills once.

use std::sync::{Arc, OnceLock};

use portbridge_core::{operations, Dispatcher, Engine, PortSink, ResponseChannel};
use portbridge_store::ConfigStore;
use tokio::runtime::{Builder, Runtime};

use crate::config::{BridgeConfig, RuntimeConfig};
use crate::logging::{self, LevelSync};
use crate::port::{self, DartApiHandle};

static BRIDGE: OnceLock<Bridge> = OnceLock::new();

/// Dispatcher plus the worker runtime its calls run on.
pub struct Bridge {
    dispatcher: Dispatcher,
    // Keeps the worker threads alive; `None` when calls run inline.
    runtime: Option<Runtime>,
}

impl Bridge {
    /// Build the bridge described by `config`, posting through `sink`.
    ///
    /// Neither a bad store file nor a runtime failure is fatal: the store
    /// falls back to memory and calls fall back to running inline. Both
    /// are logged. Patched log levels are applied to the subscriber.
    pub fn build(config: &BridgeConfig, sink: Arc<dyn PortSink>) -> Self {
        let engine = LevelSync::new(open_engine(config), |level| {
            logging::apply_level(level);
        });
        Self::with_engine(Arc::new(engine), &config.runtime, sink)
    }

    /// Build around an existing engine.
    pub fn with_engine(
        engine: Arc<dyn Engine>,
        runtime: &RuntimeConfig,
        sink: Arc<dyn PortSink>,
    ) -> Self {
        let dispatcher = Dispatcher::new(
            Arc::new(operations::standard_registry()),
            engine,
            ResponseChannel::new(sink),
        );

        match build_runtime(runtime) {
            Ok(runtime) => Self {
                dispatcher: dispatcher.with_runtime(runtime.handle().clone()),
                runtime: Some(runtime),
            },
            Err(e) => {
                tracing::error!("Failed to start worker runtime, running calls inline: {}", e);
                Self {
                    dispatcher,
                    runtime: None,
                }
            }
        }
    }

    /// The dispatcher exported calls go through.
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Whether calls run on worker threads.
    pub fn is_threaded(&self) -> bool {
        self.runtime.is_some()
    }
}

impl std::fmt::Debug for Bridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bridge")
            .field("dispatcher", &self.dispatcher)
            .field("threaded", &self.is_threaded())
            .finish()
    }
}

fn open_engine(config: &BridgeConfig) -> Arc<dyn Engine> {
    let Some(path) = &config.store.path else {
        tracing::info!("No store path configured, remotes are kept in memory");
        return Arc::new(ConfigStore::in_memory());
    };

    match ConfigStore::open(path) {
        Ok(store) => {
            tracing::info!("Using config store {}", path.display());
            Arc::new(store)
        }
        Err(e) => {
            tracing::error!("{}; remotes are kept in memory", e);
            Arc::new(ConfigStore::in_memory())
        }
    }
}

fn build_runtime(config: &RuntimeConfig) -> std::io::Result<Runtime> {
    Builder::new_multi_thread()
        .worker_threads(config.worker_threads.max(1))
        .max_blocking_threads(config.max_blocking_threads.max(1))
        .thread_name("portbridge-worker")
        .build()
}

/// Result of one [`bootstrap`] attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bootstrap {
    /// Handle stored and bridge installed.
    Ready,
    /// An earlier attempt already succeeded; nothing changed.
    AlreadyInitialized,
    /// No handle was given; nothing changed.
    NullHandle,
}

/// Store the Dart handle and install the bridge `build` returns.
///
/// The bridge is built before the handle is stored, so a panicking build
/// leaves the process uninitialized and a later attempt can succeed.
pub fn bootstrap(handle: Option<DartApiHandle>, build: impl FnOnce() -> Bridge) -> Bootstrap {
    if port::is_initialized() {
        return Bootstrap::AlreadyInitialized;
    }
    let Some(handle) = handle else {
        return Bootstrap::NullHandle;
    };

    let bridge = build();
    if port::initialize(handle).is_err() {
        return Bootstrap::AlreadyInitialized;
    }
    if !install(bridge) {
        tracing::warn!("A bridge was already installed; keeping it");
    }
    Bootstrap::Ready
}

/// Install `bridge` as the process-wide instance.
///
/// Returns `false`, dropping `bridge`, if one is already installed.
pub fn install(bridge: Bridge) -> bool {
    BRIDGE.set(bridge).is_ok()
}

/// The installed bridge, if any.
pub fn get() -> Option<&'static Bridge> {
    BRIDGE.get()
}
