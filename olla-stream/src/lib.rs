#![deny(missing_docs)]
//! Streaming client for a local text-generation server.
//!
//! Sends generate or chat requests, decodes the newline-delimited JSON
//! response stream, and assembles the text fragments as they arrive.
//!
//! # Usage
//!
//! ```no_run
//! use olla_stream::{AssembleOptions, Client, ClientConfig, spawn_relay};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ClientConfig::default().model("llama2");
//! let payload = config.translate_request("Bonjour tout le monde", "English").into();
//! let mut relay = spawn_relay(Client::new(config)?, payload, AssembleOptions::default());
//! while let Some(fragment) = relay.fragments.recv().await {
//!     print!("{fragment}");
//! }
//! relay.handle.await??;
//! # Ok(())
//! # }
//! ```
//!
//! # Pieces
//!
//! - [`decode_stream`]: bytes to [`StreamEvent`](olla_types::StreamEvent)s, ending at `done=true`
//! - [`ResponseAssembler`]: events to text, pushing each fragment to a [`FragmentSink`]
//! - [`Client`]: the HTTP boundary, including non-streaming JSON passthrough
//! - [`spawn_relay`]: run a request on its own task and consume fragments over a channel

pub mod assembler;
pub mod client;
pub mod config;
pub(crate) mod error;
pub mod relay;
pub mod sink;
pub mod streaming;
mod wire;

pub use assembler::{AssembleOptions, DEFAULT_MAX_DECODE_FAILURES, ResponseAssembler};
pub use client::Client;
pub use config::{ClientConfig, DEFAULT_HOST, DEFAULT_MODEL, DEFAULT_PORT};
pub use relay::{Relay, relay_events, spawn_relay};
pub use sink::{ChannelSink, FragmentSink, NullSink, PrintSink};
pub use streaming::{EventStream, decode_frame, decode_stream};

// Re-export olla-types for convenience
pub use olla_types::{
    AssembledResult, ChatRequest, ChatTurn, DecodeError, GenerateRequest, Metrics, Mode,
    RequestPayload, RunError, StreamError, StreamEvent, TransportError,
};
