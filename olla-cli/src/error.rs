//! Errors reported by the `olla` binary.

use std::path::PathBuf;

use olla_types::{RunError, TransportError};

/// Anything that ends an `olla` invocation with a non-zero status.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Bad or missing arguments.
    #[error("{0}")]
    Config(String),
    /// The config file could not be read.
    #[error("failed to read config file {path}: {source}")]
    ConfigRead {
        /// File that was read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },
    /// The config file is not valid.
    #[error("invalid config file {path}: {source}")]
    ConfigParse {
        /// File that was parsed.
        path: PathBuf,
        /// Underlying parse error.
        source: serde_json::Error,
    },
    /// Writing output failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// The HTTP client could not be built.
    #[error(transparent)]
    Transport(#[from] TransportError),
    /// The request or its stream failed.
    #[error(transparent)]
    Run(#[from] RunError),
    /// The producer task panicked or was cancelled.
    #[error("producer task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
