//! HTTP model - requests, responses, entities and content types.
//!
//! These are plain values: the routing layer never parses or writes the wire
//! format. `http` crate types provide the method, status, header and URI
//! vocabulary.

mod content_type;
mod entity;
mod request;
mod response;

pub use content_type::{ContentType, MediaType, UTF_8};
pub use entity::HttpEntity;
pub use request::HttpRequest;
pub use response::{ChunkedMessageEnd, HttpResponse, MessageChunk};
