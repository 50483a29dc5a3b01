//! Command-line surface.

use std::path::PathBuf;

use clap::Parser;

/// Stream generations from a local inference server.
///
/// Examples:
///   olla why is the sky blue          # stream a generation
///   olla -s -m mistral tell me a joke # with a timing summary
///   olla -j list three colors as json # single JSON document
///   olla -t bonjour tout le monde     # translate to English
#[derive(Debug, Parser)]
#[command(name = "olla", version)]
pub struct Cli {
    /// Inference server host
    #[arg(short = 'H', long, env = "OLLA_HOST", value_name = "HOST")]
    pub host: Option<String>,

    /// Inference server port
    #[arg(short, long, env = "OLLA_PORT", value_name = "PORT")]
    pub port: Option<u16>,

    /// Model name
    #[arg(short, long, env = "OLLA_MODEL", value_name = "NAME")]
    pub model: Option<String>,

    /// Print timing and token counts after the response
    #[arg(short, long)]
    pub summary: bool,

    /// Ask for a single JSON document and print it unmodified
    #[arg(short, long, conflicts_with = "translate")]
    pub json: bool,

    /// Translate the prompt instead of answering it
    #[arg(short, long)]
    pub translate: bool,

    /// Language to translate into
    #[arg(long, value_name = "LANGUAGE", requires = "translate")]
    pub target_language: Option<String>,

    /// System prompt for generation
    #[arg(long, value_name = "TEXT", conflicts_with = "translate")]
    pub system: Option<String>,

    /// How long the server keeps the model loaded (e.g. 5m, 0)
    #[arg(long, value_name = "DURATION")]
    pub keep_alive: Option<String>,

    /// Sampling temperature
    #[arg(long, value_name = "FLOAT")]
    pub temperature: Option<f64>,

    /// Random seed
    #[arg(long, value_name = "INT")]
    pub seed: Option<i64>,

    /// Maximum number of tokens to generate
    #[arg(long, value_name = "COUNT")]
    pub num_predict: Option<u32>,

    /// Connection timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub connect_timeout: Option<u64>,

    /// JSON configuration file (defaults to ./olla.json when present)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log request and stream details to stderr
    #[arg(short, long)]
    pub verbose: bool,

    /// Prompt text; multiple words are joined with spaces
    #[arg(value_name = "PROMPT")]
    pub prompt: Vec<String>,
}

impl Cli {
    /// Positional arguments joined into a single prompt.
    #[must_use]
    pub fn prompt_text(&self) -> String {
        self.prompt.join(" ")
    }
}
