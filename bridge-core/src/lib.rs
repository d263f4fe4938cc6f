//! # bridge-core
//!
//! Dispatch protocol for portbridge.
//!
//! A client runtime calls an exported function with a call token and some
//! string arguments. The call returns immediately; later, exactly one
//! [`ResponseEnvelope`](portbridge_types::ResponseEnvelope) is posted to the
//! token. This crate holds everything between those two points and no FFI:
//!
//! - [`channel`] - [`PortSink`] (the post primitive) and [`ResponseChannel`]
//! - [`responder`] - [`Responder`], the single-shot completion for one token
//! - [`registry`] - [`Operation`] records keyed by exported symbol name
//! - [`operations`] - the stock operation table
//! - [`dispatch`] - [`Dispatcher`], which runs an operation on a worker
//! - [`engine`] - the [`Engine`] trait the operations call into
//!
//! ## Example
//!
//! ```ignore
//! let sink = MockPortSink::new();
//! let dispatcher = Dispatcher::new(
//!     Arc::new(operations::standard_registry()),
//!     Arc::new(MockEngine::new()),
//!     ResponseChannel::new(Arc::new(sink.clone())),
//! );
//! dispatcher.execute("getGeneralConfig", CallToken::new(7), CallArgs::none());
//! assert!(sink.envelopes_for(CallToken::new(7))[0].success);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod args;
pub mod channel;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod operations;
pub mod registry;
pub mod responder;

pub use args::CallArgs;
pub use channel::{MockPortSink, PortSink, ResponseChannel};
pub use dispatch::Dispatcher;
pub use engine::{Engine, MockEngine};
pub use error::{BridgeError, EngineError};
pub use registry::{Operation, OperationRegistry, Param, ParamKind};
pub use responder::Responder;
