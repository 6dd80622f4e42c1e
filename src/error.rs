//! Error types for routewire.

use thiserror::Error;

/// Boxed error carried by failure messages and marshalling errors.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Main error type for all routewire operations.
#[derive(Debug, Error)]
pub enum RouteError {
    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// MsgPack serialization error.
    #[error("MsgPack encode error: {0}")]
    MsgPackEncode(#[from] rmp_serde::encode::Error),

    /// MsgPack deserialization error.
    #[error("MsgPack decode error: {0}")]
    MsgPackDecode(#[from] rmp_serde::decode::Error),

    /// A header value could not be built (e.g. a redirect target with control characters).
    #[error("Invalid header value: {0}")]
    InvalidHeader(#[from] http::header::InvalidHeaderValue),

    /// A content type string could not be parsed.
    #[error("Invalid content type: {0}")]
    InvalidContentType(String),

    /// No marshaller registered for the completed value's type.
    #[error("No marshaller registered for type {0}")]
    MarshallerNotFound(&'static str),

    /// Invalid dispatcher configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The dispatcher is already running its maximum number of requests.
    #[error("Request capacity exceeded ({0} in flight)")]
    CapacityExceeded(usize),

    /// The route failed the request and nothing rendered the failure.
    #[error("Request failed: {0}")]
    Failed(String),

    /// The request was rejected and nothing rendered the rejection.
    #[error("Request rejected: {0:?}")]
    Rejected(crate::rejection::Rejected),

    /// The response channel closed before a complete response arrived.
    #[error("Response channel closed before completion")]
    NoResponse,
}

/// Result type alias using RouteError.
pub type Result<T> = std::result::Result<T, RouteError>;
