//! Messages flowing through the responder pipeline.

use std::error::Error;
use std::fmt;
use std::sync::Arc;

use bytes::Bytes;

use super::ResponderRef;
use crate::error::BoxError;
use crate::model::{ChunkedMessageEnd, HttpResponse, MessageChunk};
use crate::rejection::Rejected;

/// An unexpected error travelling as a message instead of unwinding.
///
/// The error is reference counted so messages stay cheap to clone.
#[derive(Clone)]
pub struct Failure {
    error: Arc<dyn Error + Send + Sync>,
}

impl Failure {
    /// Wrap any error.
    pub fn new(error: impl Into<BoxError>) -> Self {
        Self {
            error: Arc::from(error.into()),
        }
    }

    /// The wrapped error.
    pub fn error(&self) -> &(dyn Error + Send + Sync + 'static) {
        self.error.as_ref()
    }
}

impl fmt::Debug for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Failure")
            .field(&self.error.to_string())
            .finish()
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.error, f)
    }
}

/// Everything a route can send to its responder.
///
/// Success, rejection and failure share one channel so every wrapping layer
/// can intercept or rewrite any of them the same way.
#[derive(Debug, Clone)]
pub enum RouteMessage {
    /// A complete response.
    Response(HttpResponse),
    /// The route declined the request.
    Rejected(Rejected),
    /// The route failed unexpectedly.
    Failure(Failure),
    /// Head of a chunked response; the entity is the first chunk.
    ChunkedStart(HttpResponse),
    /// A further body chunk.
    Chunk(MessageChunk),
    /// End of a chunked response.
    ChunkedEnd(ChunkedMessageEnd),
}

impl RouteMessage {
    /// `Chunk` message with the given data.
    pub fn chunk(data: impl Into<Bytes>) -> Self {
        RouteMessage::Chunk(MessageChunk::new(data))
    }

    /// `ChunkedEnd` message without trailer.
    pub fn chunked_end() -> Self {
        RouteMessage::ChunkedEnd(ChunkedMessageEnd::default())
    }

    /// Short name of the variant, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            RouteMessage::Response(_) => "response",
            RouteMessage::Rejected(_) => "rejected",
            RouteMessage::Failure(_) => "failure",
            RouteMessage::ChunkedStart(_) => "chunked-start",
            RouteMessage::Chunk(_) => "chunk",
            RouteMessage::ChunkedEnd(_) => "chunked-end",
        }
    }

    /// The embedded response for `Response` and `ChunkedStart`.
    pub fn http_response(&self) -> Option<&HttpResponse> {
        match self {
            RouteMessage::Response(response) | RouteMessage::ChunkedStart(response) => {
                Some(response)
            }
            _ => None,
        }
    }
}

/// A message together with the sender it was sent on behalf of.
#[derive(Clone)]
pub struct Envelope {
    pub message: RouteMessage,
    pub sender: Option<ResponderRef>,
}

impl fmt::Debug for Envelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Envelope")
            .field("message", &self.message)
            .field("has_sender", &self.sender.is_some())
            .finish()
    }
}
