//! Producer/consumer hand-off of fragments between tasks.
//!
//! The producer task owns a [`ChannelSink`] for its whole lifetime, so the
//! channel closes exactly once, after the last fragment, on every exit path.
//! The outcome of the run travels separately through the task's
//! [`JoinHandle`], never through the text channel.

use futures::Stream;
use olla_types::{AssembledResult, RequestPayload, RunError, StreamError, StreamEvent};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;

use crate::assembler::{AssembleOptions, ResponseAssembler};
use crate::client::Client;
use crate::sink::ChannelSink;

/// Consumer half of a running producer.
#[derive(Debug)]
pub struct Relay {
    /// Fragments in the order the producer pushed them. Yields `None` once the producer is done.
    pub fragments: UnboundedReceiver<String>,
    /// Outcome of the producer's run.
    pub handle: JoinHandle<Result<AssembledResult, RunError>>,
}

/// Spawn a task that sends `payload` with `client` and relays its fragments.
///
/// Must be called from within a tokio runtime.
pub fn spawn_relay(client: Client, payload: RequestPayload, options: AssembleOptions) -> Relay {
    let (mut sink, fragments) = ChannelSink::channel();
    let handle = tokio::spawn(async move {
        let result = client.run(&payload, &options, &mut sink).await;
        if let Err(err) = &result {
            tracing::debug!(error = %err, "relay producer failed");
        }
        result
    });
    Relay { fragments, handle }
}

/// Spawn a task that assembles an already-decoded event stream and relays its fragments.
pub fn relay_events<S>(events: S, options: AssembleOptions) -> Relay
where
    S: Stream<Item = Result<StreamEvent, StreamError>> + Send + 'static,
{
    let (mut sink, fragments) = ChannelSink::channel();
    let handle = tokio::spawn(async move {
        ResponseAssembler::new(options)
            .assemble(events, &mut sink)
            .await
    });
    Relay { fragments, handle }
}
