#![deny(missing_docs)]
//! `olla`: a command-line client that streams text from a local inference server.
//!
//! The binary is a thin wrapper over [`commands::execute`]; the modules are
//! public so the modes can be driven against any writer in tests.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod summary;

pub use cli::Cli;
pub use commands::execute;
pub use error::CliError;
