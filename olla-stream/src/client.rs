//! Inference server client.

use olla_types::{AssembledResult, RequestPayload, RunError, TransportError};

use crate::assembler::{AssembleOptions, ResponseAssembler};
use crate::config::ClientConfig;
use crate::error::{map_body_error, map_http_status, map_reqwest_error};
use crate::sink::FragmentSink;
use crate::streaming::{EventStream, decode_response};

/// Client for the generate and chat endpoints.
///
/// Cheap to clone; clones share the connection pool.
///
/// # Example
///
/// ```no_run
/// use olla_stream::{AssembleOptions, Client, ClientConfig, PrintSink};
///
/// # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
/// let config = ClientConfig::default().model("llama2");
/// let payload = config.generate_request("Why is the sky blue?").into();
/// let client = Client::new(config)?;
/// let result = client
///     .run(&payload, &AssembleOptions::default(), &mut PrintSink::stdout())
///     .await?;
/// println!("\n{} chars", result.text.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Client {
    config: ClientConfig,
    base_url: String,
    http: reqwest::Client,
}

impl Client {
    /// Build a client from `config`.
    pub fn new(config: ClientConfig) -> Result<Self, TransportError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }
        let http = builder.build().map_err(map_reqwest_error)?;
        Ok(Self {
            base_url: config.base_url(),
            config,
            http,
        })
    }

    /// Override the server base URL derived from host and port.
    ///
    /// Useful for testing with a local mock server.
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// The configuration this client was built from.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The base URL requests are sent to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// POST `payload` to its endpoint and check the status.
    async fn send(&self, payload: &RequestPayload) -> Result<reqwest::Response, TransportError> {
        let mode = payload.mode();
        let url = format!("{}{}", self.base_url, mode.path());
        let body = serde_json::to_vec(payload)?;

        tracing::debug!(url = %url, model = %payload.model(), ?mode, "sending request to inference server");

        let response = self
            .http
            .post(&url)
            .header("content-type", "application/json")
            .body(body)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            let body_text = response.text().await.unwrap_or_default();
            tracing::debug!(%status, body = %body_text, "inference server rejected request");
            return Err(map_http_status(status, &body_text));
        }

        Ok(response)
    }

    /// Send a streaming request and return its decoded events.
    pub async fn stream_events(&self, payload: &RequestPayload) -> Result<EventStream, TransportError> {
        let response = self.send(payload).await?;
        Ok(decode_response(response, payload.mode()))
    }

    /// Send a non-streaming request and return the body as sent by the server.
    pub async fn fetch_document(&self, payload: &RequestPayload) -> Result<String, TransportError> {
        let response = self.send(payload).await?;
        response.text().await.map_err(map_body_error)
    }

    /// Send `payload` and assemble the response.
    ///
    /// Streaming payloads push every fragment to `sink` as it arrives and
    /// return the concatenated text. A generate payload with `stream: false`
    /// bypasses frame decoding entirely: the single JSON document is returned
    /// unmodified as the result text and `sink` is not used.
    pub async fn run<K>(
        &self,
        payload: &RequestPayload,
        options: &AssembleOptions,
        sink: &mut K,
    ) -> Result<AssembledResult, RunError>
    where
        K: FragmentSink + ?Sized,
    {
        if payload.is_passthrough() {
            let text = self.fetch_document(payload).await?;
            return Ok(AssembledResult {
                text,
                metrics: None,
            });
        }

        let events = self.stream_events(payload).await?;
        ResponseAssembler::new(options.clone())
            .assemble(events, sink)
            .await
    }
}
