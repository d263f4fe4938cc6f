//! Exported C symbols.
//!
//! Every operation symbol takes the reply port first, then its arguments as
//! NUL-terminated UTF-8 strings. A null argument reads as the empty string
//! and invalid UTF-8 is replaced, so validation in the operation decides
//! what to do with it. Symbols return immediately; the envelope follows on
//! the port.

#![allow(non_snake_case)]

use std::ffi::{c_char, CStr};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use allo_isolate::ffi::DartPostCObjectFnType;
use portbridge_core::CallArgs;
use portbridge_types::CallToken;

use crate::config::BridgeConfig;
use crate::port::{DartApiHandle, DartPortSink};
use crate::{logging, state};

/// Bootstrap the library. Call once with `NativeApi.postCObject`.
///
/// Loads `PORTBRIDGE_CONFIG`, installs logging, builds the bridge and
/// then stores the messaging handle. Once that has succeeded, later calls
/// are logged and ignored, whatever handle they pass.
///
/// # Safety
///
/// `post_cobject` must be null or Dart's `Dart_PostCObject`.
#[no_mangle]
pub unsafe extern "C" fn initNativeDartBridge(post_cobject: Option<DartPostCObjectFnType>) {
    let result = panic::catch_unwind(|| {
        let loaded = BridgeConfig::from_env();
        let config = loaded.as_ref().cloned().unwrap_or_default();
        logging::init(&config.logging.filter);
        if let Err(e) = loaded {
            tracing::error!("{}; using defaults", e);
        }

        let handle = post_cobject.map(DartApiHandle::new);
        let build = || state::Bridge::build(&config, Arc::new(DartPortSink));
        match state::bootstrap(handle, build) {
            state::Bootstrap::Ready => tracing::info!(
                "portbridge ready with {} operations",
                state::get().map_or(0, |bridge| bridge.dispatcher().registry().len())
            ),
            state::Bootstrap::AlreadyInitialized => {
                tracing::warn!("Ignoring repeated initNativeDartBridge")
            }
            state::Bootstrap::NullHandle => {
                tracing::error!("initNativeDartBridge called with a null handle")
            }
        }
    });
    if result.is_err() {
        tracing::error!("initNativeDartBridge panicked");
    }
}

/// Read one C string argument.
///
/// # Safety
///
/// `ptr` must be null or point to a NUL-terminated string.
unsafe fn read_arg(ptr: *const c_char) -> String {
    if ptr.is_null() {
        return String::new();
    }
    CStr::from_ptr(ptr).to_string_lossy().into_owned()
}

/// Route one exported call to the installed dispatcher.
///
/// # Safety
///
/// Every pointer in `args` must satisfy [`read_arg`].
unsafe fn dispatch(symbol: &'static str, port: i64, args: &[*const c_char]) {
    let token = CallToken::new(port);
    let args: CallArgs = args.iter().map(|&ptr| read_arg(ptr)).collect();

    let result = panic::catch_unwind(AssertUnwindSafe(|| match state::get() {
        Some(bridge) => bridge.dispatcher().dispatch(symbol, token, args),
        None => tracing::error!(
            "{} called on port {} before initNativeDartBridge; no response will be sent",
            symbol,
            token
        ),
    }));
    if result.is_err() {
        tracing::error!("{} panicked while dispatching to port {}", symbol, token);
    }
}

macro_rules! exports {
    ($( $(#[$doc:meta])* fn $symbol:ident($($arg:ident),*); )*) => {
        /// Names of every exported operation symbol.
        pub const EXPORTED_OPERATIONS: &[&str] = &[$(stringify!($symbol)),*];

        $(
            $(#[$doc])*
            ///
            /// # Safety
            ///
            /// Every string argument must be null or a NUL-terminated string
            /// that stays valid for the duration of the call.
            #[no_mangle]
            pub unsafe extern "C" fn $symbol(port: i64 $(, $arg: *const c_char)*) {
                dispatch(stringify!($symbol), port, &[$($arg),*]);
            }
        )*
    };
}

exports! {
    /// Reply with the general configuration as JSON.
    fn getGeneralConfig();
    /// Merge a JSON patch into the general configuration.
    fn patchGeneralConfig(patch);
    /// Reply with the remote names as a JSON array.
    fn listRemotes();
    /// Reply with one remote's configuration as JSON.
    fn getRemoteConfig(name);
    /// Create a remote from a JSON object carrying `type` and options.
    fn createRemote(name, config);
    /// Merge JSON options into an existing remote.
    fn updateRemoteConfig(name, options);
    /// Set a single option on a remote.
    fn setOption(name, key, value);
    /// Copy a remote under a new name.
    fn copyRemote(source, destination);
    /// Delete a remote.
    fn deleteRemote(name);
}
