//! At-most-once completion at the root of the pipeline.
//!
//! The guard tracks the lifecycle of one request:
//!
//! ```text
//! Open ──Response / Rejected / Failure──► Closed
//!  │
//!  └──ChunkedStart──► Streaming ──Chunk*──► Streaming ──ChunkedEnd / Failure──► Closed
//! ```
//!
//! Messages that don't fit the current state are dropped and logged. The
//! state is a single atomic, so the guard is lock-free and may be told from
//! several tasks.

use std::sync::atomic::{AtomicU8, Ordering};

use super::{Responder, ResponderRef, RouteMessage};

const OPEN: u8 = 0;
const STREAMING: u8 = 1;
const CLOSED: u8 = 2;

/// Forwards one complete outcome per request and drops everything after it.
pub struct CompletionGuard {
    inner: ResponderRef,
    state: AtomicU8,
}

impl CompletionGuard {
    /// Guard `inner`, starting in the open state.
    pub fn new(inner: ResponderRef) -> Self {
        Self {
            inner,
            state: AtomicU8::new(OPEN),
        }
    }

    /// Whether a final message has passed the guard.
    #[inline]
    pub fn is_completed(&self) -> bool {
        self.state.load(Ordering::Acquire) == CLOSED
    }

    /// Whether a chunked response is in progress.
    #[inline]
    pub fn is_streaming(&self) -> bool {
        self.state.load(Ordering::Acquire) == STREAMING
    }

    fn transition(&self, from: u8, to: u8) -> bool {
        self.state
            .compare_exchange(from, to, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    fn admit(&self, message: &RouteMessage) -> bool {
        match message {
            RouteMessage::Response(_) | RouteMessage::Rejected(_) => self.transition(OPEN, CLOSED),
            RouteMessage::Failure(_) => {
                self.transition(OPEN, CLOSED) || self.transition(STREAMING, CLOSED)
            }
            RouteMessage::ChunkedStart(_) => self.transition(OPEN, STREAMING),
            RouteMessage::Chunk(_) => self.is_streaming(),
            RouteMessage::ChunkedEnd(_) => self.transition(STREAMING, CLOSED),
        }
    }
}

impl Responder for CompletionGuard {
    fn tell(&self, message: RouteMessage, sender: Option<ResponderRef>) {
        if self.admit(&message) {
            self.inner.tell(message, sender);
        } else {
            tracing::warn!(
                "Dropping {} message: request already completed or not streaming",
                message.kind()
            );
        }
    }
}
