//! Request payloads, stream events and performance metrics.
//!
//! The server accepts two request shapes:
//! - POST `/api/generate` with a single prompt, answered by frames carrying a
//!   `response` text fragment
//! - POST `/api/chat` with an ordered list of turns, answered by frames carrying
//!   `message.content`
//!
//! Both stream newline-delimited JSON unless a generate request asks for
//! `stream: false`, in which case the server emits one JSON document.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Path of the plain generation endpoint.
pub const GENERATE_PATH: &str = "/api/generate";

/// Path of the chat endpoint.
pub const CHAT_PATH: &str = "/api/chat";

/// Which endpoint a request targets, and therefore where fragments live in each frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Single-prompt generation; fragments come from `response`.
    Generate,
    /// Multi-turn chat; fragments come from `message.content`.
    Chat,
}

impl Mode {
    /// Endpoint path for this mode.
    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            Self::Generate => GENERATE_PATH,
            Self::Chat => CHAT_PATH,
        }
    }
}

/// Author of a chat turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Instructions that frame the conversation.
    System,
    /// Text written by the person using the client.
    User,
    /// Text produced by the model.
    Assistant,
}

/// One turn of a chat conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    /// Who wrote this turn.
    pub role: Role,
    /// Turn text.
    pub content: String,
}

impl ChatTurn {
    /// A system turn.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    /// A user turn.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// An assistant turn.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Structured output format requested from the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseFormat {
    /// The model must answer with a JSON document.
    Json,
}

/// Sampling and runtime options forwarded as the `options` object.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GenerationOptions {
    /// Sampling temperature.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Random seed for reproducible output.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<i64>,
    /// Maximum number of tokens to generate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_predict: Option<u32>,
    /// Top-k sampling.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
    /// Top-p (nucleus) sampling.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    /// Context window size in tokens.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_ctx: Option<u32>,
}

impl GenerationOptions {
    /// True when no option is set, so the object can be left off the wire.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Body of a POST to the generate endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerateRequest {
    /// Model identifier (e.g. "llama2").
    pub model: String,
    /// Prompt text.
    pub prompt: String,
    /// Requested output format. Set together with `stream: false` for JSON passthrough.
    #[serde(rename = "format", skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ResponseFormat>,
    /// Whether the server streams frames (`true`) or sends a single document.
    pub stream: bool,
    /// System prompt overriding the model's default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    /// How long the server keeps the model loaded (e.g. "5m", "0").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keep_alive: Option<String>,
    /// Sampling options.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<GenerationOptions>,
}

impl GenerateRequest {
    /// A streaming request with no optional fields set.
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            response_format: None,
            stream: true,
            system: None,
            keep_alive: None,
            options: None,
        }
    }

    /// Ask for a single JSON document instead of a frame stream.
    #[must_use]
    pub fn json(mut self) -> Self {
        self.response_format = Some(ResponseFormat::Json);
        self.stream = false;
        self
    }
}

/// Body of a POST to the chat endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequest {
    /// Model identifier.
    pub model: String,
    /// Conversation turns. Order is preserved on the wire.
    pub messages: Vec<ChatTurn>,
    /// Chat requests always stream.
    pub stream: bool,
    /// How long the server keeps the model loaded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keep_alive: Option<String>,
    /// Sampling options.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<GenerationOptions>,
}

impl ChatRequest {
    /// A chat request over the given turns.
    pub fn new(model: impl Into<String>, messages: Vec<ChatTurn>) -> Self {
        Self {
            model: model.into(),
            messages,
            stream: true,
            keep_alive: None,
            options: None,
        }
    }
}

/// A request for either endpoint. Built once per invocation and not mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RequestPayload {
    /// Generate endpoint body.
    Generate(GenerateRequest),
    /// Chat endpoint body.
    Chat(ChatRequest),
}

impl RequestPayload {
    /// Endpoint this payload is sent to.
    #[must_use]
    pub fn mode(&self) -> Mode {
        match self {
            Self::Generate(_) => Mode::Generate,
            Self::Chat(_) => Mode::Chat,
        }
    }

    /// Model named by the payload.
    #[must_use]
    pub fn model(&self) -> &str {
        match self {
            Self::Generate(req) => &req.model,
            Self::Chat(req) => &req.model,
        }
    }

    /// Whether the server answers with one JSON document rather than a frame stream.
    #[must_use]
    pub fn is_passthrough(&self) -> bool {
        matches!(self, Self::Generate(req) if !req.stream)
    }
}

impl From<GenerateRequest> for RequestPayload {
    fn from(req: GenerateRequest) -> Self {
        Self::Generate(req)
    }
}

impl From<ChatRequest> for RequestPayload {
    fn from(req: ChatRequest) -> Self {
        Self::Chat(req)
    }
}

/// Timing and token counts reported on the terminal frame.
///
/// Durations are nanoseconds as sent by the server.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metrics {
    /// Wall time for the whole request.
    #[serde(default)]
    pub total_duration: u64,
    /// Time spent loading the model.
    #[serde(default)]
    pub load_duration: u64,
    /// Number of prompt tokens evaluated.
    #[serde(default)]
    pub prompt_eval_count: u64,
    /// Time spent evaluating the prompt.
    #[serde(default)]
    pub prompt_eval_duration: u64,
    /// Number of tokens generated.
    #[serde(default)]
    pub eval_count: u64,
    /// Time spent generating.
    #[serde(default)]
    pub eval_duration: u64,
}

impl Metrics {
    /// Convert a nanosecond count to fractional seconds.
    #[must_use]
    pub fn seconds(nanos: u64) -> f64 {
        nanos as f64 / 1e9
    }

    /// Total request time.
    #[must_use]
    pub fn total(&self) -> Duration {
        Duration::from_nanos(self.total_duration)
    }

    /// Model load time.
    #[must_use]
    pub fn load(&self) -> Duration {
        Duration::from_nanos(self.load_duration)
    }

    /// Prompt evaluation time.
    #[must_use]
    pub fn prompt_eval(&self) -> Duration {
        Duration::from_nanos(self.prompt_eval_duration)
    }

    /// Generation time.
    #[must_use]
    pub fn eval(&self) -> Duration {
        Duration::from_nanos(self.eval_duration)
    }

    /// Generated tokens per second, or `None` if no generation time was reported.
    #[must_use]
    pub fn tokens_per_second(&self) -> Option<f64> {
        if self.eval_duration == 0 {
            return None;
        }
        Some(self.eval_count as f64 / Self::seconds(self.eval_duration))
    }
}

/// One decoded frame of the response stream.
///
/// Exactly one event per stream has `done == true` and it is the last one.
/// `metrics` is only ever populated on that terminal event.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StreamEvent {
    /// Text produced since the previous event. May be empty.
    pub fragment: String,
    /// Terminal flag.
    pub done: bool,
    /// Why generation stopped (e.g. "stop", "length"), terminal event only.
    pub done_reason: Option<String>,
    /// Model that produced the frame.
    pub model: Option<String>,
    /// Server timestamp of the frame.
    pub created_at: Option<String>,
    /// Performance metrics, terminal event only.
    pub metrics: Option<Metrics>,
}

impl StreamEvent {
    /// A non-terminal event carrying `fragment`.
    pub fn fragment(fragment: impl Into<String>) -> Self {
        Self {
            fragment: fragment.into(),
            ..Self::default()
        }
    }

    /// Whether this event ends the stream.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.done
    }
}

/// Final text of a run plus optional metrics. Owned by the caller after return.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssembledResult {
    /// Concatenation of every fragment in arrival order, or the raw document in passthrough mode.
    pub text: String,
    /// Metrics of the terminal event, when the caller asked for them.
    pub metrics: Option<Metrics>,
}
