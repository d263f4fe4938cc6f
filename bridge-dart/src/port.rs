//! Dart messaging handle and the port sink built on it.
//!
//! The handle is `NativeApi.postCObject` from `dart:ffi`. It is stored once
//! per process; every later post goes through it.

use std::sync::OnceLock;

use allo_isolate::ffi::DartPostCObjectFnType;
use allo_isolate::Isolate;
use portbridge_core::PortSink;
use portbridge_types::CallToken;

static DART_API: OnceLock<DartApiHandle> = OnceLock::new();

/// The Dart runtime's `Dart_PostCObject` entry point.
#[derive(Clone, Copy)]
pub struct DartApiHandle(DartPostCObjectFnType);

impl DartApiHandle {
    /// Wrap the function pointer handed over by Dart.
    pub fn new(post_cobject: DartPostCObjectFnType) -> Self {
        Self(post_cobject)
    }
}

impl std::fmt::Debug for DartApiHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("DartApiHandle")
            .field(&(self.0 as *const ()))
            .finish()
    }
}

/// Initialization failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InitError {
    /// The messaging handle was already stored.
    #[error("Dart messaging handle already initialized")]
    AlreadyInitialized,
}

/// Store the messaging handle. Only the first call succeeds.
pub fn initialize(handle: DartApiHandle) -> Result<(), InitError> {
    DART_API
        .set(handle)
        .map_err(|_| InitError::AlreadyInitialized)?;
    // SAFETY: the pointer comes from `NativeApi.postCObject`, which stays
    // valid for the lifetime of the Dart VM that loaded this library.
    unsafe { allo_isolate::store_dart_post_cobject(handle.0) };
    tracing::debug!("Dart messaging handle stored");
    Ok(())
}

/// Whether [`initialize`] has succeeded.
pub fn is_initialized() -> bool {
    DART_API.get().is_some()
}

/// Posts envelopes to Dart native ports.
///
/// The call token is the port's `nativePort` id. Posting before
/// [`initialize`] fails without touching Dart.
#[derive(Debug, Default, Clone, Copy)]
pub struct DartPortSink;

impl PortSink for DartPortSink {
    fn post(&self, token: CallToken, message: String) -> bool {
        if !is_initialized() {
            return false;
        }
        Isolate::new(token.port()).post(message)
    }
}
