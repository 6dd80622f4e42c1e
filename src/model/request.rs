//! Inbound request value and content negotiation.
//!
//! Negotiation follows the usual `Accept` / `Accept-Charset` rules:
//!
//! - a missing header accepts everything
//! - the most specific matching range decides (`*/*` < `text/*` < `text/plain`)
//! - `q=0` excludes

use http::header::{HeaderName, HeaderValue, ACCEPT, ACCEPT_CHARSET};
use http::{HeaderMap, Method, Uri};

use super::{ContentType, HttpEntity, MediaType};

/// An inbound HTTP request as seen by the routing layer.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
    pub entity: HttpEntity,
}

impl HttpRequest {
    /// Create a request with no headers and an empty entity.
    pub fn new(method: Method, uri: Uri) -> Self {
        Self {
            method,
            uri,
            headers: HeaderMap::new(),
            entity: HttpEntity::Empty,
        }
    }

    /// Shorthand for a `GET` request.
    pub fn get(uri: Uri) -> Self {
        Self::new(Method::GET, uri)
    }

    /// Add a header, keeping existing values for the same name.
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    /// Replace the entity.
    pub fn with_entity(mut self, entity: HttpEntity) -> Self {
        self.entity = entity;
        self
    }

    /// The request path (without query).
    #[inline]
    pub fn path(&self) -> &str {
        self.uri.path()
    }

    /// Whether a response of the given content type is acceptable to the client.
    pub fn accepts_content_type(&self, content_type: &ContentType) -> bool {
        self.accepts_media_type(&content_type.media_type)
            && content_type
                .charset
                .as_deref()
                .map_or(true, |charset| self.accepts_charset(charset))
    }

    /// Whether the media type is acceptable per the `Accept` header.
    pub fn accepts_media_type(&self, media_type: &MediaType) -> bool {
        let ranges = header_ranges(&self.headers, &ACCEPT);
        if ranges.is_empty() {
            return true;
        }

        ranges
            .iter()
            .filter_map(|(range, q)| media_range_specificity(range, media_type).map(|s| (s, *q)))
            .max_by_key(|(specificity, _)| *specificity)
            .is_some_and(|(_, q)| q > 0.0)
    }

    /// Whether the charset is acceptable per the `Accept-Charset` header.
    pub fn accepts_charset(&self, charset: &str) -> bool {
        let ranges = header_ranges(&self.headers, &ACCEPT_CHARSET);
        if ranges.is_empty() {
            return true;
        }

        ranges
            .iter()
            .filter_map(|(range, q)| {
                if range.eq_ignore_ascii_case(charset) {
                    Some((1u8, *q))
                } else if range == "*" {
                    Some((0u8, *q))
                } else {
                    None
                }
            })
            .max_by_key(|(specificity, _)| *specificity)
            .is_some_and(|(_, q)| q > 0.0)
    }
}

/// Parse all values of a comma-separated, q-weighted header into `(range, q)` pairs.
fn header_ranges(headers: &HeaderMap, name: &HeaderName) -> Vec<(String, f32)> {
    headers
        .get_all(name)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .filter_map(|item| {
            let mut params = item.split(';');
            let range = params.next()?.trim().to_ascii_lowercase();
            if range.is_empty() {
                return None;
            }
            let q = params
                .filter_map(|param| param.split_once('='))
                .find(|(name, _)| name.trim().eq_ignore_ascii_case("q"))
                .and_then(|(_, value)| value.trim().parse::<f32>().ok())
                .unwrap_or(1.0);
            Some((range, q))
        })
        .collect()
}

/// Specificity of a media range matching the media type, or `None` if it doesn't match.
fn media_range_specificity(range: &str, media_type: &MediaType) -> Option<u8> {
    let (main, sub) = range.split_once('/')?;
    match (main.trim(), sub.trim()) {
        ("*", "*") => Some(0),
        (main, "*") if main == media_type.main_type() => Some(1),
        (main, sub) if main == media_type.main_type() && sub == media_type.sub_type() => Some(2),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request_with(name: HeaderName, value: &'static str) -> HttpRequest {
        HttpRequest::get(Uri::from_static("/")).with_header(name, HeaderValue::from_static(value))
    }

    #[test]
    fn test_no_accept_header_accepts_everything() {
        let req = HttpRequest::get(Uri::from_static("/"));
        assert!(req.accepts_content_type(&ContentType::APPLICATION_JSON));
        assert!(req.accepts_content_type(&ContentType::APPLICATION_MSGPACK));
    }

    #[test]
    fn test_exact_and_wildcard_ranges() {
        let req = request_with(ACCEPT, "text/*, application/json");
        assert!(req.accepts_media_type(&MediaType::TEXT_HTML));
        assert!(req.accepts_media_type(&MediaType::APPLICATION_JSON));
        assert!(!req.accepts_media_type(&MediaType::APPLICATION_MSGPACK));
    }

    #[test]
    fn test_most_specific_range_wins() {
        let req = request_with(ACCEPT, "text/*;q=0, text/plain, */*");
        assert!(req.accepts_media_type(&MediaType::TEXT_PLAIN));
        assert!(!req.accepts_media_type(&MediaType::TEXT_HTML));
        assert!(req.accepts_media_type(&MediaType::APPLICATION_JSON));
    }

    #[test]
    fn test_charset_negotiation() {
        let req = request_with(ACCEPT_CHARSET, "ISO-8859-1");
        assert!(!req.accepts_content_type(&ContentType::TEXT_PLAIN_UTF8));
        assert!(req.accepts_charset("iso-8859-1"));
        // binary types don't carry a charset
        assert!(req.accepts_content_type(&ContentType::APPLICATION_OCTET_STREAM));

        let req = request_with(ACCEPT_CHARSET, "*, utf-8;q=0");
        assert!(!req.accepts_charset("utf-8"));
        assert!(req.accepts_charset("utf-16"));
    }

    #[test]
    fn test_multiple_accept_headers_combine() {
        let req = request_with(ACCEPT, "application/json")
            .with_header(ACCEPT, HeaderValue::from_static("text/html"));
        assert!(req.accepts_media_type(&MediaType::APPLICATION_JSON));
        assert!(req.accepts_media_type(&MediaType::TEXT_HTML));
        assert!(!req.accepts_media_type(&MediaType::TEXT_PLAIN));
    }

    #[test]
    fn test_path_ignores_query() {
        let req = HttpRequest::get(Uri::from_static("/users/7?verbose=true"));
        assert_eq!(req.path(), "/users/7");
    }
}
