//! Response frame shapes for `/api/generate` and `/api/chat`.
//!
//! Both endpoints share one envelope:
//! - `model`, `created_at`, `done` on every frame
//! - `done_reason` and the nanosecond timing fields on the terminal frame
//!
//! They differ only in where the text fragment lives: `response` for generate,
//! `message.content` for chat. A server-side failure mid-stream arrives as a
//! bare `{"error": "..."}` object.

use olla_types::Metrics;
use serde::Deserialize;

/// One NDJSON frame as sent by the server.
#[derive(Debug, Deserialize)]
pub(crate) struct WireFrame {
    /// Model that produced the frame.
    #[serde(default)]
    pub model: Option<String>,
    /// Server timestamp.
    #[serde(default)]
    pub created_at: Option<String>,
    /// Generate-mode fragment.
    #[serde(default)]
    pub response: Option<String>,
    /// Chat-mode message carrying the fragment.
    #[serde(default)]
    pub message: Option<WireMessage>,
    /// Terminal flag. Required: a frame without it is not part of this protocol.
    pub done: bool,
    /// Why generation stopped.
    #[serde(default)]
    pub done_reason: Option<String>,
    /// Timing and token counts. All zero on non-terminal frames.
    #[serde(flatten)]
    pub metrics: Metrics,
}

/// The `message` object of a chat frame.
#[derive(Debug, Deserialize)]
pub(crate) struct WireMessage {
    /// Fragment text.
    #[serde(default)]
    pub content: String,
}

/// Shape of a server error, sent as a non-200 body or in place of a frame.
#[derive(Debug, Deserialize)]
pub(crate) struct WireError {
    pub error: String,
}
