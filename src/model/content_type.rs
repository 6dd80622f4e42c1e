//! Media types and content types.
//!
//! A [`ContentType`] is a [`MediaType`] plus an optional charset. Both compare
//! case-insensitively because they are normalised to lowercase on construction.
//!
//! # Example
//!
//! ```
//! use routewire::model::{ContentType, MediaType};
//!
//! let ct: ContentType = "text/html; charset=UTF-8".parse().unwrap();
//! assert_eq!(ct.media_type, MediaType::TEXT_HTML);
//! assert_eq!(ct.charset.as_deref(), Some("utf-8"));
//! assert_eq!(ct.to_string(), "text/html; charset=utf-8");
//! ```

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use crate::error::RouteError;

/// Default charset for textual content types.
pub const UTF_8: &str = "utf-8";

/// A `main/sub` media type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MediaType {
    main_type: Cow<'static, str>,
    sub_type: Cow<'static, str>,
}

impl MediaType {
    /// `text/plain`
    pub const TEXT_PLAIN: MediaType = MediaType::from_static("text", "plain");
    /// `text/html`
    pub const TEXT_HTML: MediaType = MediaType::from_static("text", "html");
    /// `application/json`
    pub const APPLICATION_JSON: MediaType = MediaType::from_static("application", "json");
    /// `application/msgpack`
    pub const APPLICATION_MSGPACK: MediaType = MediaType::from_static("application", "msgpack");
    /// `application/octet-stream`
    pub const APPLICATION_OCTET_STREAM: MediaType =
        MediaType::from_static("application", "octet-stream");

    /// Create a media type from static, already lowercase parts.
    pub const fn from_static(main_type: &'static str, sub_type: &'static str) -> Self {
        Self {
            main_type: Cow::Borrowed(main_type),
            sub_type: Cow::Borrowed(sub_type),
        }
    }

    /// Create a media type, lowercasing both parts.
    pub fn new(main_type: &str, sub_type: &str) -> Self {
        Self {
            main_type: Cow::Owned(main_type.trim().to_ascii_lowercase()),
            sub_type: Cow::Owned(sub_type.trim().to_ascii_lowercase()),
        }
    }

    /// The part before the `/`.
    #[inline]
    pub fn main_type(&self) -> &str {
        &self.main_type
    }

    /// The part after the `/`.
    #[inline]
    pub fn sub_type(&self) -> &str {
        &self.sub_type
    }

    /// Whether content of this type is text and should carry a charset.
    pub fn is_text(&self) -> bool {
        self.main_type == "text" || self.sub_type == "json" || self.sub_type.ends_with("+json")
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.main_type, self.sub_type)
    }
}

impl FromStr for MediaType {
    type Err = RouteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (main, sub) = s
            .trim()
            .split_once('/')
            .ok_or_else(|| RouteError::InvalidContentType(s.to_string()))?;
        if main.trim().is_empty() || sub.trim().is_empty() {
            return Err(RouteError::InvalidContentType(s.to_string()));
        }
        Ok(MediaType::new(main, sub))
    }
}

/// A media type with an optional charset.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentType {
    pub media_type: MediaType,
    pub charset: Option<Cow<'static, str>>,
}

impl ContentType {
    /// `text/plain; charset=utf-8`
    pub const TEXT_PLAIN_UTF8: ContentType = ContentType::from_static(MediaType::TEXT_PLAIN, UTF_8);
    /// `text/html; charset=utf-8`
    pub const TEXT_HTML_UTF8: ContentType = ContentType::from_static(MediaType::TEXT_HTML, UTF_8);
    /// `application/json; charset=utf-8`
    pub const APPLICATION_JSON: ContentType =
        ContentType::from_static(MediaType::APPLICATION_JSON, UTF_8);
    /// `application/msgpack`
    pub const APPLICATION_MSGPACK: ContentType =
        ContentType::binary(MediaType::APPLICATION_MSGPACK);
    /// `application/octet-stream`
    pub const APPLICATION_OCTET_STREAM: ContentType =
        ContentType::binary(MediaType::APPLICATION_OCTET_STREAM);

    const fn from_static(media_type: MediaType, charset: &'static str) -> Self {
        Self {
            media_type,
            charset: Some(Cow::Borrowed(charset)),
        }
    }

    /// Content type without a charset.
    pub const fn binary(media_type: MediaType) -> Self {
        Self {
            media_type,
            charset: None,
        }
    }

    /// Content type with the given charset (lowercased).
    pub fn with_charset(media_type: MediaType, charset: &str) -> Self {
        Self {
            media_type,
            charset: Some(Cow::Owned(charset.trim().to_ascii_lowercase())),
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.charset {
            Some(charset) => write!(f, "{}; charset={}", self.media_type, charset),
            None => write!(f, "{}", self.media_type),
        }
    }
}

impl FromStr for ContentType {
    type Err = RouteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split(';');
        let media_type: MediaType = parts.next().unwrap_or_default().parse()?;
        let charset = parts.find_map(|param| {
            let (name, value) = param.split_once('=')?;
            name.trim()
                .eq_ignore_ascii_case("charset")
                .then(|| value.trim().trim_matches('"').to_string())
        });

        Ok(match charset {
            Some(charset) => ContentType::with_charset(media_type, &charset),
            None => ContentType::binary(media_type),
        })
    }
}
