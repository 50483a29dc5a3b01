//! NDJSON stream decoding.
//!
//! The server emits one JSON object per line:
//! ```text
//! {"model":"llama2","created_at":"...","response":"Hel","done":false}
//! {"model":"llama2","created_at":"...","response":"lo","done":false}
//! {"model":"llama2","created_at":"...","response":"","done":true,"total_duration":1500000000,"eval_count":2}
//! ```
//!
//! [`decode_stream`] turns a raw byte stream into a lazy sequence of
//! `Result<StreamEvent, StreamError>`:
//! - `Ok(event)` per decoded frame; the sequence ends right after the first
//!   event with `done == true`
//! - `Err(StreamError::Decode(_))` per malformed frame; the sequence continues
//! - `Err(StreamError::Incomplete)` when input ends before a terminal frame
//! - `Err(StreamError::Transport(_))` when reading the body fails
//!
//! The decoder does no work in the background. Dropping the stream drops the
//! byte source.

use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures::{Stream, StreamExt};
use olla_types::{DecodeError, Mode, StreamError, StreamEvent, TransportError};

use crate::wire::{WireError, WireFrame};

/// A decoded event sequence, boxed so it can be returned from the client.
pub struct EventStream {
    /// The underlying event stream.
    pub receiver: Pin<Box<dyn Stream<Item = Result<StreamEvent, StreamError>> + Send>>,
}

impl Stream for EventStream {
    type Item = Result<StreamEvent, StreamError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.receiver.as_mut().poll_next(cx)
    }
}

impl std::fmt::Debug for EventStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventStream").finish_non_exhaustive()
    }
}

/// Wrap an HTTP response body into an [`EventStream`].
pub(crate) fn decode_response(response: reqwest::Response, mode: Mode) -> EventStream {
    decode_stream(response.bytes_stream(), mode)
}

/// Decode a raw byte stream of NDJSON frames into [`StreamEvent`]s.
///
/// Chunks may split frames anywhere, including inside a multi-byte UTF-8
/// sequence. Frames are only decoded once their delimiter has arrived, or at
/// end of input for a trailing unterminated frame.
pub fn decode_stream<S, E>(byte_stream: S, mode: Mode) -> EventStream
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: std::error::Error + Send + Sync + 'static,
{
    let events = async_stream::stream! {
        let mut frames = FrameBuffer::default();
        let mut bytes_stream = std::pin::pin!(byte_stream);
        let mut exhausted = false;

        loop {
            while let Some(frame) = frames.next_frame() {
                match decode_frame(mode, &frame) {
                    Ok(event) => {
                        let done = event.done;
                        yield Ok(event);
                        if done {
                            return;
                        }
                    }
                    Err(err) => {
                        tracing::warn!(frame = %err.frame, reason = %err.reason, "skipping malformed frame");
                        yield Err(StreamError::Decode(err));
                    }
                }
            }

            if exhausted {
                break;
            }

            match bytes_stream.next().await {
                Some(Ok(chunk)) => frames.push(&chunk),
                Some(Err(e)) => {
                    yield Err(StreamError::Transport(TransportError::Read(Box::new(e))));
                    return;
                }
                None => {
                    // Terminate a trailing frame that arrived without its newline.
                    frames.push(b"\n");
                    exhausted = true;
                }
            }
        }

        yield Err(StreamError::Incomplete);
    };

    EventStream {
        receiver: Box::pin(events),
    }
}

/// Decode one frame (without its delimiter) into a [`StreamEvent`].
///
/// The fragment is taken from `response` in generate mode and from
/// `message.content` in chat mode. Metrics are attached only to the terminal
/// frame.
pub fn decode_frame(mode: Mode, raw: &[u8]) -> Result<StreamEvent, DecodeError> {
    let text = std::str::from_utf8(raw)
        .map_err(|e| DecodeError::new(raw, format!("invalid UTF-8: {e}")))?;

    let frame: WireFrame = serde_json::from_str(text).map_err(|e| {
        match serde_json::from_str::<WireError>(text) {
            Ok(server) => DecodeError::new(raw, format!("server reported error: {}", server.error)),
            Err(_) => DecodeError::new(raw, e.to_string()),
        }
    })?;

    let fragment = match mode {
        Mode::Generate => frame.response.unwrap_or_default(),
        Mode::Chat => frame.message.map(|m| m.content).unwrap_or_default(),
    };

    Ok(StreamEvent {
        fragment,
        done: frame.done,
        done_reason: frame.done_reason,
        model: frame.model,
        created_at: frame.created_at,
        metrics: frame.done.then_some(frame.metrics),
    })
}

/// Splits buffered bytes into newline-delimited frames.
#[derive(Debug, Default)]
pub(crate) struct FrameBuffer {
    buf: Vec<u8>,
}

impl FrameBuffer {
    /// Append a chunk read from the source.
    pub(crate) fn push(&mut self, chunk: &[u8]) {
        self.buf.extend_from_slice(chunk);
    }

    /// Take the next complete frame, without its `\n` or trailing `\r`.
    ///
    /// Blank frames are dropped rather than returned.
    pub(crate) fn next_frame(&mut self) -> Option<Vec<u8>> {
        loop {
            let pos = self.buf.iter().position(|b| *b == b'\n')?;
            let mut frame: Vec<u8> = self.buf.drain(..=pos).collect();
            frame.pop();
            if frame.last() == Some(&b'\r') {
                frame.pop();
            }
            if frame.iter().all(u8::is_ascii_whitespace) {
                continue;
            }
            return Some(frame);
        }
    }

    /// Bytes received but not yet part of a complete frame.
    pub(crate) fn pending(&self) -> usize {
        self.buf.len()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
