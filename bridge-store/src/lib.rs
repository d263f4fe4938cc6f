//! # bridge-store
//!
//! Remote configuration store implementing [`portbridge_core::Engine`].
//!
//! Holds the general settings and a table of named remotes, each with a
//! backend type and text options, in the shape of an rclone config. The
//! store can live purely in memory or be backed by a TOML file:
//!
//! ```toml
//! [general]
//! allowLan = true
//! bindAddress = "0.0.0.0"
//! port = 8080
//!
//! [remotes.s3box]
//! type = "s3"
//! region = "eu-west-1"
//! ```
//!
//! Every successful mutation rewrites the file (temp file, then rename).

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod names;
pub mod store;

pub use error::StoreError;
pub use store::ConfigStore;
