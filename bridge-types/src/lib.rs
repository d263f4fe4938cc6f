//! # bridge-types
//!
//! Wire format types for the portbridge Dart FFI bridge.
//!
//! This crate provides the foundational types used across all portbridge crates:
//! - [`CallToken`] - The caller-owned port number a response is addressed to
//! - [`ResponseEnvelope`] and [`Outcome`] - The single response produced per call
//! - [`GeneralConfig`], [`RemoteConfig`], [`NewRemote`], [`RemoteOptions`] -
//!   Schema-bound payloads carried as JSON strings across the boundary
//! - [`WireError`] - Error types

#![warn(missing_docs)]
#![warn(clippy::all)]

mod envelope;
mod error;
mod payload;
mod token;

pub use envelope::{Outcome, ResponseEnvelope};
pub use error::WireError;
pub use payload::{GeneralConfig, LogLevel, NewRemote, OptionValue, RemoteConfig, RemoteOptions};
pub use token::CallToken;
