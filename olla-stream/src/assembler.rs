//! Response assembly: pull decoded events, forward fragments, stop at the terminal event.

use futures::{Stream, StreamExt};
use olla_types::{AssembledResult, RunError, StreamError, StreamEvent};

use crate::sink::FragmentSink;

/// Malformed frames tolerated per run before the run fails.
pub const DEFAULT_MAX_DECODE_FAILURES: usize = 1;

/// Per-run assembly settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembleOptions {
    /// Keep the terminal event's metrics in the result.
    pub capture_metrics: bool,
    /// How many malformed frames are skipped before the run fails.
    pub max_decode_failures: usize,
}

impl Default for AssembleOptions {
    fn default() -> Self {
        Self {
            capture_metrics: false,
            max_decode_failures: DEFAULT_MAX_DECODE_FAILURES,
        }
    }
}

impl AssembleOptions {
    /// Set whether metrics are captured.
    #[must_use]
    pub fn capture_metrics(mut self, capture: bool) -> Self {
        self.capture_metrics = capture;
        self
    }

    /// Set the malformed-frame tolerance.
    #[must_use]
    pub fn max_decode_failures(mut self, max: usize) -> Self {
        self.max_decode_failures = max;
        self
    }
}

/// Drives a decoded event stream to completion.
///
/// Fragments are appended to the result and pushed to the sink one event at a
/// time, in arrival order. Empty fragments are skipped.
#[derive(Debug, Clone, Default)]
pub struct ResponseAssembler {
    options: AssembleOptions,
}

impl ResponseAssembler {
    /// Create an assembler with the given options.
    #[must_use]
    pub fn new(options: AssembleOptions) -> Self {
        Self { options }
    }

    /// The options this assembler runs with.
    #[must_use]
    pub fn options(&self) -> &AssembleOptions {
        &self.options
    }

    /// Consume `events` until the terminal event.
    ///
    /// On failure the returned [`RunError`] still carries the text assembled
    /// so far. Failures are:
    /// - any fatal [`StreamError`] from the decoder, propagated unchanged
    /// - more malformed frames than [`AssembleOptions::max_decode_failures`],
    ///   reported as [`StreamError::RepeatedDecode`]
    /// - the event source ending without a terminal event, reported as
    ///   [`StreamError::Incomplete`]
    pub async fn assemble<S, K>(&self, events: S, sink: &mut K) -> Result<AssembledResult, RunError>
    where
        S: Stream<Item = Result<StreamEvent, StreamError>>,
        K: FragmentSink + ?Sized,
    {
        let mut events = std::pin::pin!(events);
        let mut text = String::new();
        let mut decode_failures = 0usize;

        while let Some(item) = events.next().await {
            match item {
                Ok(event) => {
                    if !event.fragment.is_empty() {
                        text.push_str(&event.fragment);
                        sink.accept(&event.fragment);
                    }
                    if event.done {
                        tracing::debug!(
                            model = event.model.as_deref().unwrap_or_default(),
                            done_reason = event.done_reason.as_deref().unwrap_or_default(),
                            bytes = text.len(),
                            "stream complete"
                        );
                        let metrics = if self.options.capture_metrics {
                            event.metrics
                        } else {
                            None
                        };
                        return Ok(AssembledResult { text, metrics });
                    }
                }
                Err(StreamError::Decode(err)) => {
                    decode_failures += 1;
                    if decode_failures > self.options.max_decode_failures {
                        return Err(RunError::new(
                            StreamError::RepeatedDecode {
                                count: decode_failures,
                                last: err,
                            },
                            text,
                        ));
                    }
                }
                Err(fatal) => return Err(RunError::new(fatal, text)),
            }
        }

        Err(RunError::new(StreamError::Incomplete, text))
    }
}
