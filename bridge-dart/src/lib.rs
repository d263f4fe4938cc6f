//! # bridge-dart
//!
//! Dart FFI surface for portbridge.
//!
//! The shared library exports one C symbol per operation. Dart calls a
//! symbol with `receivePort.sendPort.nativePort` as the first argument and
//! awaits the port; the symbol returns at once and the response envelope
//! arrives on the port later.
//!
//! ## Usage from Dart
//!
//! ```text
//! // once, at startup
//! lib.initNativeDartBridge(NativeApi.postCObject);
//!
//! // per call
//! final port = ReceivePort();
//! lib.getRemoteConfig(port.sendPort.nativePort, name.toNativeUtf8());
//! final envelope = jsonDecode(await port.first as String);
//! port.close();
//! if (envelope['success']) {
//!   final remote = jsonDecode(envelope['data']);
//! }
//! ```
//!
//! ## Layout
//!
//! - [`exports`] - the `extern "C"` symbols
//! - [`port`] - the write-once Dart messaging handle and [`DartPortSink`]
//! - [`state`] - the process-wide [`Bridge`] (dispatcher + worker runtime)
//! - [`config`] - [`BridgeConfig`], read from `PORTBRIDGE_CONFIG`
//! - [`logging`] - tracing subscriber setup

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod exports;
pub mod logging;
pub mod port;
pub mod state;

pub use config::{BridgeConfig, ConfigError};
pub use port::{initialize, is_initialized, DartApiHandle, DartPortSink, InitError};
pub use state::Bridge;
