//! Message bodies.

use bytes::Bytes;

use super::ContentType;

/// The body of a request or response.
///
/// A non-empty entity always carries its content type. Building one from empty
/// data yields [`HttpEntity::Empty`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum HttpEntity {
    /// No body.
    #[default]
    Empty,
    /// A body with its content type.
    NonEmpty {
        content_type: ContentType,
        data: Bytes,
    },
}

impl HttpEntity {
    /// Create an entity, collapsing empty data to [`HttpEntity::Empty`].
    pub fn new(content_type: ContentType, data: impl Into<Bytes>) -> Self {
        let data = data.into();
        if data.is_empty() {
            HttpEntity::Empty
        } else {
            HttpEntity::NonEmpty { content_type, data }
        }
    }

    /// `text/plain; charset=utf-8` entity.
    pub fn text(text: impl Into<String>) -> Self {
        Self::new(ContentType::TEXT_PLAIN_UTF8, text.into())
    }

    /// `text/html; charset=utf-8` entity.
    pub fn html(html: impl Into<String>) -> Self {
        Self::new(ContentType::TEXT_HTML_UTF8, html.into())
    }

    /// Whether the entity carries no data.
    #[inline]
    pub fn is_empty(&self) -> bool {
        matches!(self, HttpEntity::Empty)
    }

    /// Content type of a non-empty entity.
    pub fn content_type(&self) -> Option<&ContentType> {
        match self {
            HttpEntity::Empty => None,
            HttpEntity::NonEmpty { content_type, .. } => Some(content_type),
        }
    }

    /// Body bytes (empty for [`HttpEntity::Empty`]).
    pub fn data(&self) -> Bytes {
        match self {
            HttpEntity::Empty => Bytes::new(),
            HttpEntity::NonEmpty { data, .. } => data.clone(),
        }
    }

    /// Body decoded as UTF-8, replacing invalid sequences.
    pub fn as_string(&self) -> String {
        match self {
            HttpEntity::Empty => String::new(),
            HttpEntity::NonEmpty { data, .. } => String::from_utf8_lossy(data).into_owned(),
        }
    }
}

impl From<String> for HttpEntity {
    fn from(text: String) -> Self {
        HttpEntity::text(text)
    }
}

impl From<&str> for HttpEntity {
    fn from(text: &str) -> Self {
        HttpEntity::text(text)
    }
}

impl From<Bytes> for HttpEntity {
    fn from(data: Bytes) -> Self {
        HttpEntity::new(ContentType::APPLICATION_OCTET_STREAM, data)
    }
}
