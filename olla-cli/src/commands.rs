//! The three output modes: streamed generation, JSON passthrough, translation.

use std::io::{self, Write};

use olla_stream::{AssembleOptions, Client, NullSink, PrintSink, spawn_relay};
use olla_types::GenerateRequest;

use crate::cli::Cli;
use crate::config::{FileConfig, Settings};
use crate::error::CliError;
use crate::summary;

/// Marker printed before streamed output in generate mode.
pub const PROMPT_MARKER: &str = ">>>";

/// Resolve settings from the working directory and run one invocation against stdout.
pub async fn execute(cli: Cli) -> Result<(), CliError> {
    let cwd = std::env::current_dir()?;
    let file = FileConfig::discover(cli.config.as_deref(), &cwd)?;
    let settings = Settings::resolve(&cli, file);
    let mut stdout = io::stdout();
    dispatch(&cli, settings, &mut stdout).await
}

/// Run the mode selected by `cli` with already resolved `settings`, writing to `out`.
pub async fn dispatch<W: Write>(cli: &Cli, settings: Settings, out: &mut W) -> Result<(), CliError> {
    let prompt = cli.prompt_text();
    if prompt.trim().is_empty() {
        return Err(CliError::Config("a prompt is required".to_string()));
    }

    let client = Client::new(settings.client.clone())?;
    tracing::debug!(
        base_url = client.base_url(),
        model = %settings.client.model,
        "resolved client"
    );

    if cli.translate {
        return translate(client, &prompt, &settings.target_language, out).await;
    }

    let mut request = client.config().generate_request(prompt);
    request.system = cli.system.clone();
    if cli.json {
        json(&client, request.json(), out).await
    } else {
        generate(&client, request, cli.summary, out).await
    }
}

/// Stream a generation to `out`, then optionally the timing summary.
pub async fn generate<W: Write>(
    client: &Client,
    request: GenerateRequest,
    show_summary: bool,
    out: &mut W,
) -> Result<(), CliError> {
    writeln!(out, "{PROMPT_MARKER}")?;
    out.flush()?;

    let options = AssembleOptions::default().capture_metrics(show_summary);
    let outcome = {
        let mut sink = PrintSink::new(&mut *out);
        client.run(&request.into(), &options, &mut sink).await
    };
    // Terminate the partial line even when the stream failed midway.
    writeln!(out)?;

    let result = outcome?;
    if let Some(metrics) = result.metrics.filter(|_| show_summary) {
        write!(out, "{}", summary::render(&metrics))?;
    }
    out.flush()?;
    Ok(())
}

/// Fetch a single JSON document and print it as received.
pub async fn json<W: Write>(
    client: &Client,
    request: GenerateRequest,
    out: &mut W,
) -> Result<(), CliError> {
    let result = client
        .run(&request.into(), &AssembleOptions::default(), &mut NullSink)
        .await?;
    writeln!(out, "{}", result.text)?;
    out.flush()?;
    Ok(())
}

/// Translate `text` on a producer task and print fragments as they are relayed.
pub async fn translate<W: Write>(
    client: Client,
    text: &str,
    target_language: &str,
    out: &mut W,
) -> Result<(), CliError> {
    let payload = client.config().translate_request(text, target_language).into();
    let mut relay = spawn_relay(client, payload, AssembleOptions::default());

    while let Some(fragment) = relay.fragments.recv().await {
        out.write_all(fragment.as_bytes())?;
        out.flush()?;
    }
    let outcome = relay.handle.await?;
    writeln!(out)?;
    out.flush()?;

    outcome?;
    Ok(())
}
