//! Wrapping layers.
//!
//! Each layer owns the responder it wraps and decides what, if anything, to
//! forward to it.

use super::{Responder, ResponderRef, RouteMessage};

/// Outcome of an intercepting handler.
#[derive(Debug)]
pub enum Intercept {
    /// The message was consumed here.
    Handled,
    /// Not handled; forward the message unchanged.
    Pass(RouteMessage),
}

/// Forwards `f(message)`.
pub struct MapResponder<F> {
    inner: ResponderRef,
    f: F,
}

impl<F> MapResponder<F>
where
    F: Fn(RouteMessage) -> RouteMessage + Send + Sync + 'static,
{
    /// Apply `f` to each message before `inner` sees it.
    pub fn new(inner: ResponderRef, f: F) -> Self {
        Self { inner, f }
    }
}

impl<F> Responder for MapResponder<F>
where
    F: Fn(RouteMessage) -> RouteMessage + Send + Sync + 'static,
{
    fn tell(&self, message: RouteMessage, sender: Option<ResponderRef>) {
        self.inner.tell((self.f)(message), sender);
    }
}

/// Forwards every message of `f(message)`, in order.
pub struct FlatMapResponder<F> {
    inner: ResponderRef,
    f: F,
}

impl<F> FlatMapResponder<F>
where
    F: Fn(RouteMessage) -> Vec<RouteMessage> + Send + Sync + 'static,
{
    /// Expand each message with `f` and forward the results in order.
    pub fn new(inner: ResponderRef, f: F) -> Self {
        Self { inner, f }
    }
}

impl<F> Responder for FlatMapResponder<F>
where
    F: Fn(RouteMessage) -> Vec<RouteMessage> + Send + Sync + 'static,
{
    fn tell(&self, message: RouteMessage, sender: Option<ResponderRef>) {
        for expanded in (self.f)(message) {
            self.inner.tell(expanded, sender.clone());
        }
    }
}

/// Lets `f` consume messages; whatever it passes on is forwarded.
pub struct InterceptResponder<F> {
    inner: ResponderRef,
    f: F,
}

impl<F> InterceptResponder<F>
where
    F: Fn(RouteMessage) -> Intercept + Send + Sync + 'static,
{
    /// Let `f` decide, per message, whether `inner` sees it.
    pub fn new(inner: ResponderRef, f: F) -> Self {
        Self { inner, f }
    }
}

impl<F> Responder for InterceptResponder<F>
where
    F: Fn(RouteMessage) -> Intercept + Send + Sync + 'static,
{
    fn tell(&self, message: RouteMessage, sender: Option<ResponderRef>) {
        match (self.f)(message) {
            Intercept::Handled => {}
            Intercept::Pass(message) => self.inner.tell(message, sender),
        }
    }
}

/// Substitutes a default sender for anonymous sends.
pub struct DefaultSenderResponder {
    inner: ResponderRef,
    default_sender: ResponderRef,
}

impl DefaultSenderResponder {
    /// Forward to `inner`, filling in `default_sender` when none is given.
    pub fn new(inner: ResponderRef, default_sender: ResponderRef) -> Self {
        Self {
            inner,
            default_sender,
        }
    }
}

impl Responder for DefaultSenderResponder {
    fn tell(&self, message: RouteMessage, sender: Option<ResponderRef>) {
        let sender = sender.unwrap_or_else(|| self.default_sender.clone());
        self.inner.tell(message, Some(sender));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::responder::ChannelResponder;
    use std::sync::Arc;

    #[test]
    fn test_map_responder_rewrites() {
        let (root, mut rx) = ChannelResponder::channel();
        let layer = MapResponder::new(root, |m| match m {
            RouteMessage::Chunk(_) => RouteMessage::chunk("rewritten"),
            other => other,
        });

        layer.tell(RouteMessage::chunk("original"), None);

        let envelope = rx.try_recv().unwrap();
        match envelope.message {
            RouteMessage::Chunk(chunk) => assert_eq!(&chunk.data[..], b"rewritten"),
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn test_flat_map_responder_keeps_order() {
        let (root, mut rx) = ChannelResponder::channel();
        let layer = FlatMapResponder::new(root, |_| {
            vec![
                RouteMessage::chunk("a"),
                RouteMessage::chunk("b"),
                RouteMessage::chunk("c"),
            ]
        });

        layer.tell(RouteMessage::chunked_end(), None);

        let mut seen = Vec::new();
        while let Ok(envelope) = rx.try_recv() {
            if let RouteMessage::Chunk(chunk) = envelope.message {
                seen.push(chunk.data);
            }
        }
        assert_eq!(seen, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_intercept_responder_consumes() {
        let (root, mut rx) = ChannelResponder::channel();
        let layer = InterceptResponder::new(root, |m| match m {
            RouteMessage::Chunk(_) => Intercept::Handled,
            other => Intercept::Pass(other),
        });

        layer.tell(RouteMessage::chunk("swallowed"), None);
        assert!(rx.try_recv().is_err());

        layer.tell(RouteMessage::chunked_end(), None);
        assert!(matches!(
            rx.try_recv().unwrap().message,
            RouteMessage::ChunkedEnd(_)
        ));
    }

    #[test]
    fn test_default_sender_only_fills_missing() {
        let (root, mut rx) = ChannelResponder::channel();
        let (default_sender, _default_rx) = ChannelResponder::channel();
        let (explicit, _explicit_rx) = ChannelResponder::channel();
        let layer = DefaultSenderResponder::new(root, default_sender.clone());

        layer.tell(RouteMessage::chunked_end(), None);
        let sender = rx.try_recv().unwrap().sender.unwrap();
        assert!(Arc::ptr_eq(&sender, &default_sender));

        layer.tell(RouteMessage::chunked_end(), Some(explicit.clone()));
        let sender = rx.try_recv().unwrap().sender.unwrap();
        assert!(Arc::ptr_eq(&sender, &explicit));
    }
}
