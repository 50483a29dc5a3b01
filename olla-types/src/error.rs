//! Error types for all olla crates.

/// Failures at the HTTP boundary. Always fatal; requests are never retried.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The request could not be sent (connection refused, DNS failure, etc.).
    #[error("failed to make request: {0}")]
    Request(#[source] Box<dyn std::error::Error + Send + Sync>),
    /// The request or the connection attempt timed out.
    #[error("request timed out: {0}")]
    Timeout(#[source] Box<dyn std::error::Error + Send + Sync>),
    /// The server answered with a non-success status.
    #[error("received non-200 response status {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, kept for diagnostics.
        body: String,
    },
    /// Reading the response body failed part way through.
    #[error("error reading from stream: {0}")]
    Read(#[source] Box<dyn std::error::Error + Send + Sync>),
    /// The request body could not be serialized.
    #[error("failed to marshal JSON: {0}")]
    Encode(#[from] serde_json::Error),
}

impl TransportError {
    /// Whether this failure was a timeout.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }

    /// The HTTP status, if the server answered at all.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// A single frame that could not be decoded into an event.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("error decoding JSON ({reason}): {frame}")]
pub struct DecodeError {
    /// The offending raw frame, lossily converted to text.
    pub frame: String,
    /// What went wrong.
    pub reason: String,
}

impl DecodeError {
    /// Build a decode error from raw frame bytes.
    pub fn new(frame: &[u8], reason: impl Into<String>) -> Self {
        Self {
            frame: String::from_utf8_lossy(frame).into_owned(),
            reason: reason.into(),
        }
    }
}

/// Errors surfaced while consuming a response stream.
///
/// `Decode` is the only non-fatal kind: the decoder yields it and keeps going.
/// Every other kind ends the sequence.
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    /// HTTP-level failure.
    #[error(transparent)]
    Transport(#[from] TransportError),
    /// One malformed frame.
    #[error(transparent)]
    Decode(#[from] DecodeError),
    /// End of input was reached before a `done=true` frame.
    #[error("stream ended without a terminal done event")]
    Incomplete,
    /// More malformed frames than the assembler tolerates.
    #[error("{count} malformed frames received, last: {last}")]
    RepeatedDecode {
        /// How many malformed frames were seen.
        count: usize,
        /// The most recent one.
        last: DecodeError,
    },
}

impl StreamError {
    /// Whether this error ends the stream.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::Decode(_))
    }
}

/// A failed run: the fatal error plus whatever text was assembled before it.
#[derive(Debug, thiserror::Error)]
#[error("{kind}")]
pub struct RunError {
    kind: StreamError,
    partial: String,
}

impl RunError {
    /// Pair an error with the text assembled so far.
    pub fn new(kind: StreamError, partial: impl Into<String>) -> Self {
        Self {
            kind,
            partial: partial.into(),
        }
    }

    /// The underlying error.
    #[must_use]
    pub fn kind(&self) -> &StreamError {
        &self.kind
    }

    /// Text assembled before the failure. Empty if nothing arrived.
    #[must_use]
    pub fn partial_text(&self) -> &str {
        &self.partial
    }

    /// Split into the error and the partial text.
    #[must_use]
    pub fn into_parts(self) -> (StreamError, String) {
        (self.kind, self.partial)
    }
}

impl From<StreamError> for RunError {
    fn from(kind: StreamError) -> Self {
        Self::new(kind, String::new())
    }
}

impl From<TransportError> for RunError {
    fn from(err: TransportError) -> Self {
        Self::new(StreamError::Transport(err), String::new())
    }
}
