//! Settings resolution: CLI flag, then environment, then config file, then defaults.
//!
//! Flags and environment variables are merged by clap before they reach
//! [`Settings::resolve`], which only has to fall back to the file and the
//! built-in defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use olla_stream::ClientConfig;
use olla_types::GenerationOptions;
use serde::Deserialize;

use crate::cli::Cli;
use crate::error::CliError;

/// Config file picked up from the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "olla.json";

/// Language used by translate mode when none is configured.
pub const DEFAULT_TARGET_LANGUAGE: &str = "English";

/// Contents of an `olla.json` config file. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    /// Server host.
    pub host: Option<String>,
    /// Server port.
    pub port: Option<u16>,
    /// Model name.
    pub model: Option<String>,
    /// keep_alive duration.
    pub keep_alive: Option<String>,
    /// Translate mode target language.
    pub target_language: Option<String>,
    /// Sampling temperature.
    pub temperature: Option<f64>,
    /// Random seed.
    pub seed: Option<i64>,
    /// Token limit.
    pub num_predict: Option<u32>,
    /// Context window size.
    pub num_ctx: Option<u32>,
}

impl FileConfig {
    /// Read and parse a config file.
    pub fn from_path(path: &Path) -> Result<Self, CliError> {
        let raw = std::fs::read_to_string(path).map_err(|source| CliError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| CliError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load the explicit file if given, otherwise `dir/olla.json` if it exists.
    pub fn discover(explicit: Option<&Path>, dir: &Path) -> Result<Option<Self>, CliError> {
        if let Some(path) = explicit {
            return Self::from_path(path).map(Some);
        }
        let default_path: PathBuf = dir.join(DEFAULT_CONFIG_FILE);
        if default_path.exists() {
            tracing::debug!(path = %default_path.display(), "using config file");
            Self::from_path(&default_path).map(Some)
        } else {
            Ok(None)
        }
    }
}

/// Fully resolved settings for one invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Client configuration, passed by value into the client.
    pub client: ClientConfig,
    /// Translate mode target language.
    pub target_language: String,
}

impl Settings {
    /// Merge parsed arguments over an optional config file.
    pub fn resolve(cli: &Cli, file: Option<FileConfig>) -> Self {
        let file = file.unwrap_or_default();
        let defaults = ClientConfig::default();

        let options = GenerationOptions {
            temperature: cli.temperature.or(file.temperature),
            seed: cli.seed.or(file.seed),
            num_predict: cli.num_predict.or(file.num_predict),
            num_ctx: file.num_ctx,
            ..Default::default()
        };

        let client = ClientConfig {
            host: cli.host.clone().or(file.host).unwrap_or(defaults.host),
            port: cli.port.or(file.port).unwrap_or(defaults.port),
            model: cli.model.clone().or(file.model).unwrap_or(defaults.model),
            keep_alive: cli.keep_alive.clone().or(file.keep_alive),
            connect_timeout: cli.connect_timeout.map(Duration::from_secs),
            options: None,
        }
        .options(options);

        let target_language = cli
            .target_language
            .clone()
            .or(file.target_language)
            .unwrap_or_else(|| DEFAULT_TARGET_LANGUAGE.to_string());

        Self {
            client,
            target_language,
        }
    }
}
