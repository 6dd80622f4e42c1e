//! Concrete responders: a tokio channel and a plain closure.
//!
//! The channel responder is the usual root of a pipeline: routes send from
//! any task and the boundary layer reads outcomes asynchronously.
//!
//! ```text
//! Route task 1 ─┐
//! Route task 2 ─┼─► mpsc::UnboundedSender<Envelope> ─► ResponseStream
//! Route task N ─┘
//! ```

use std::sync::Arc;

use tokio::sync::mpsc;

use super::{Envelope, Responder, ResponderRef, RouteMessage};

/// Responder that forwards every message into an unbounded tokio channel.
///
/// `tell` never blocks, so the channel is unbounded; one request produces a
/// bounded number of messages unless it streams.
pub struct ChannelResponder {
    tx: mpsc::UnboundedSender<Envelope>,
}

impl ChannelResponder {
    /// Create a responder and the receiving end of its channel.
    pub fn channel() -> (ResponderRef, mpsc::UnboundedReceiver<Envelope>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Arc::new(Self { tx }), rx)
    }
}

impl Responder for ChannelResponder {
    fn tell(&self, message: RouteMessage, sender: Option<ResponderRef>) {
        if let Err(e) = self.tx.send(Envelope { message, sender }) {
            tracing::debug!(
                "Response receiver dropped, discarding {} message",
                e.0.message.kind()
            );
        }
    }
}

/// Responder backed by a closure.
pub struct FnResponder<F>(F);

impl<F> Responder for FnResponder<F>
where
    F: Fn(RouteMessage, Option<ResponderRef>) + Send + Sync + 'static,
{
    fn tell(&self, message: RouteMessage, sender: Option<ResponderRef>) {
        (self.0)(message, sender)
    }
}

/// Wrap a closure as a responder.
///
/// # Example
///
/// ```
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::sync::Arc;
/// use routewire::responder::{responder_fn, Responder, RouteMessage};
///
/// let count = Arc::new(AtomicUsize::new(0));
/// let counter = count.clone();
/// let responder = responder_fn(move |_message, _sender| {
///     counter.fetch_add(1, Ordering::SeqCst);
/// });
///
/// responder.tell(RouteMessage::chunked_end(), None);
/// assert_eq!(count.load(Ordering::SeqCst), 1);
/// ```
pub fn responder_fn<F>(f: F) -> ResponderRef
where
    F: Fn(RouteMessage, Option<ResponderRef>) + Send + Sync + 'static,
{
    Arc::new(FnResponder(f))
}
