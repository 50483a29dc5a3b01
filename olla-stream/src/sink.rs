//! Destinations for text fragments.
//!
//! The assembler only knows [`FragmentSink`]. A direct print target, a channel
//! feeding another task, and a plain closure all implement it.

use std::io::{self, Write};

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// Receives each text fragment as it arrives, in arrival order.
pub trait FragmentSink {
    /// Accept one fragment.
    fn accept(&mut self, fragment: &str);
}

impl<F> FragmentSink for F
where
    F: FnMut(&str),
{
    fn accept(&mut self, fragment: &str) {
        self(fragment)
    }
}

/// Discards every fragment.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl FragmentSink for NullSink {
    fn accept(&mut self, _fragment: &str) {}
}

/// Writes each fragment to a writer and flushes immediately.
///
/// After the first write error the sink stops writing; the error is logged,
/// not propagated, so the run itself still completes.
#[derive(Debug)]
pub struct PrintSink<W: Write> {
    writer: W,
    failed: bool,
}

impl PrintSink<io::Stdout> {
    /// Print to standard output.
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> PrintSink<W> {
    /// Print to `writer`.
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            failed: false,
        }
    }

    /// Recover the writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> FragmentSink for PrintSink<W> {
    fn accept(&mut self, fragment: &str) {
        if self.failed {
            return;
        }
        let written = self
            .writer
            .write_all(fragment.as_bytes())
            .and_then(|()| self.writer.flush());
        if let Err(e) = written {
            tracing::warn!(error = %e, "failed to write fragment, dropping further output");
            self.failed = true;
        }
    }
}

/// Sends each fragment over an unbounded channel to a consumer task.
///
/// The channel closes when this sink is dropped. If the consumer goes away
/// first, remaining fragments are dropped and the producer carries on.
#[derive(Debug)]
pub struct ChannelSink {
    sender: UnboundedSender<String>,
    closed: bool,
}

impl ChannelSink {
    /// Wrap an existing sender.
    pub fn new(sender: UnboundedSender<String>) -> Self {
        Self {
            sender,
            closed: false,
        }
    }

    /// Create a sink and the receiver that observes it.
    #[must_use]
    pub fn channel() -> (Self, UnboundedReceiver<String>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self::new(sender), receiver)
    }
}

impl FragmentSink for ChannelSink {
    fn accept(&mut self, fragment: &str) {
        if self.closed {
            return;
        }
        if self.sender.send(fragment.to_owned()).is_err() {
            tracing::debug!("fragment consumer dropped, discarding remaining output");
            self.closed = true;
        }
    }
}
