//! Client configuration and request building.

use std::time::Duration;

use olla_types::{ChatRequest, ChatTurn, GenerateRequest, GenerationOptions, Mode};

/// Default inference server host.
pub const DEFAULT_HOST: &str = "localhost";

/// Default inference server port.
pub const DEFAULT_PORT: u16 = 11434;

/// Default model name.
pub const DEFAULT_MODEL: &str = "llama2";

/// Where the server lives and what every request should carry.
///
/// Passed by value into [`Client`](crate::Client); there is no global state.
///
/// # Example
///
/// ```
/// use olla_stream::ClientConfig;
///
/// let config = ClientConfig::default().host("gpu-box").port(8080).model("mistral");
/// assert_eq!(config.base_url(), "http://gpu-box:8080");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Server host name or address. May carry an `http://`/`https://` scheme.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Model used for every request built from this config.
    pub model: String,
    /// How long the server keeps the model loaded after a request.
    pub keep_alive: Option<String>,
    /// Limit on establishing the TCP connection. Streaming reads are never timed out.
    pub connect_timeout: Option<Duration>,
    /// Sampling options attached to every request.
    pub options: Option<GenerationOptions>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.into(),
            port: DEFAULT_PORT,
            model: DEFAULT_MODEL.into(),
            keep_alive: None,
            connect_timeout: None,
            options: None,
        }
    }
}

impl ClientConfig {
    /// Override the host.
    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Override the port.
    #[must_use]
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Override the model.
    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the keep_alive duration (e.g. `"5m"`, `"0"`).
    #[must_use]
    pub fn keep_alive(mut self, duration: impl Into<String>) -> Self {
        self.keep_alive = Some(duration.into());
        self
    }

    /// Set the connection timeout.
    #[must_use]
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Set sampling options. Empty options are left off the wire.
    #[must_use]
    pub fn options(mut self, options: GenerationOptions) -> Self {
        self.options = (!options.is_empty()).then_some(options);
        self
    }

    /// `scheme://host:port` of the server.
    #[must_use]
    pub fn base_url(&self) -> String {
        let host = self.host.trim_end_matches('/');
        if host.starts_with("http://") || host.starts_with("https://") {
            format!("{host}:{}", self.port)
        } else {
            format!("http://{host}:{}", self.port)
        }
    }

    /// Full URL of the endpoint serving `mode`.
    #[must_use]
    pub fn endpoint(&self, mode: Mode) -> String {
        format!("{}{}", self.base_url(), mode.path())
    }

    /// A streaming generate request for `prompt`.
    pub fn generate_request(&self, prompt: impl Into<String>) -> GenerateRequest {
        let mut request = GenerateRequest::new(self.model.clone(), prompt);
        request.keep_alive = self.keep_alive.clone();
        request.options = self.options.clone();
        request
    }

    /// A chat request over `messages`, in order.
    pub fn chat_request(&self, messages: Vec<ChatTurn>) -> ChatRequest {
        let mut request = ChatRequest::new(self.model.clone(), messages);
        request.keep_alive = self.keep_alive.clone();
        request.options = self.options.clone();
        request
    }

    /// A two-turn chat asking the model to translate `text` into `target_language`.
    pub fn translate_request(&self, text: impl Into<String>, target_language: &str) -> ChatRequest {
        self.chat_request(vec![
            ChatTurn::system(format!("Translate the following text to {target_language}")),
            ChatTurn::user(text),
        ])
    }
}
