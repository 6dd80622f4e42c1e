//! Outbound response values, including the pieces of a chunked response.

use bytes::Bytes;
use http::{HeaderMap, StatusCode};

use super::HttpEntity;

/// A complete response, or the head of a chunked one.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub entity: HttpEntity,
}

impl HttpResponse {
    /// Create a response with the given status, no headers and an empty entity.
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            entity: HttpEntity::Empty,
        }
    }

    /// `200 OK` with the given entity.
    pub fn ok(entity: impl Into<HttpEntity>) -> Self {
        Self::new(StatusCode::OK).with_entity(entity)
    }

    /// Replace the entity.
    pub fn with_entity(mut self, entity: impl Into<HttpEntity>) -> Self {
        self.entity = entity.into();
        self
    }

    /// Replace all headers.
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }
}

impl Default for HttpResponse {
    fn default() -> Self {
        Self::new(StatusCode::OK)
    }
}

/// One chunk of a chunked response body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageChunk {
    pub data: Bytes,
}

impl MessageChunk {
    /// Chunk carrying `data`.
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self { data: data.into() }
    }
}

/// Terminates a chunked response, optionally carrying trailer headers.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChunkedMessageEnd {
    /// Headers sent after the last chunk.
    pub trailer: HeaderMap,
}
