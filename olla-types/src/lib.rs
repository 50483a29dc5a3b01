#![deny(missing_docs)]
//! Wire types and error taxonomy for the olla inference-server client.
//!
//! This crate holds the data that crosses the HTTP boundary: request payloads
//! for the generate and chat endpoints, the decoded [`StreamEvent`] frames of
//! the newline-delimited response stream, and the [`AssembledResult`] handed
//! back to callers. It has no I/O of its own.

pub mod error;
pub mod types;

pub use error::*;
pub use types::*;
