//! Rejections - the "this route doesn't apply" signal.
//!
//! A route that declines a request sends [`Rejected`] instead of a response.
//! Alternative combinators collect the rejections of every declining branch so
//! a rejection handler can render the most useful client error, e.g. the union
//! of allowed methods.
//!
//! # Example
//!
//! ```
//! use routewire::rejection::{Rejected, Rejection};
//! use http::Method;
//!
//! let first = Rejected::new(vec![Rejection::MethodNotAllowed { supported: Method::GET }]);
//! let second = Rejected::new(vec![Rejection::PathNotMatched]);
//!
//! let merged = first.concat(second);
//! assert_eq!(merged.len(), 2);
//! ```

use http::Method;

use crate::model::ContentType;

/// Reason a route declined a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// The request method is not the one this route serves.
    MethodNotAllowed { supported: Method },
    /// The unmatched path didn't match this route.
    PathNotMatched,
    /// The request entity has a content type this route cannot read.
    UnsupportedRequestContentType { supported: Vec<ContentType> },
    /// No representation of the response is acceptable to the client.
    UnacceptedResponseContentType { supported: Vec<ContentType> },
    /// A required header is missing.
    MissingHeader { name: String },
    /// A header is present but its value is unusable.
    MalformedHeader { name: String, message: String },
    /// Request content failed validation.
    Validation { message: String },
    /// Application-defined rejection.
    Custom { name: String, message: String },
}

/// The ordered list of rejections sent when a request is declined.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Rejected {
    rejections: Vec<Rejection>,
}

impl Rejected {
    /// Wrap a list of rejections.
    pub fn new(rejections: Vec<Rejection>) -> Self {
        Self { rejections }
    }

    /// The rejections, in the order they were collected.
    #[inline]
    pub fn rejections(&self) -> &[Rejection] {
        &self.rejections
    }

    /// Number of rejections.
    #[inline]
    pub fn len(&self) -> usize {
        self.rejections.len()
    }

    /// Whether the list is empty, which renders as `404 Not Found`.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rejections.is_empty()
    }

    /// Take the rejections out.
    pub fn into_rejections(self) -> Vec<Rejection> {
        self.rejections
    }

    /// Transform each rejection.
    pub fn map<F>(self, f: F) -> Self
    where
        F: FnMut(Rejection) -> Rejection,
    {
        Self::new(self.rejections.into_iter().map(f).collect())
    }

    /// Replace each rejection by zero or more rejections, preserving order.
    pub fn flat_map<F, I>(self, f: F) -> Self
    where
        F: FnMut(Rejection) -> I,
        I: IntoIterator<Item = Rejection>,
    {
        Self::new(self.rejections.into_iter().flat_map(f).collect())
    }

    /// Append the rejections of another alternative.
    pub fn concat(mut self, other: Rejected) -> Self {
        self.rejections.extend(other.rejections);
        self
    }
}

impl From<Vec<Rejection>> for Rejected {
    fn from(rejections: Vec<Rejection>) -> Self {
        Self::new(rejections)
    }
}

impl FromIterator<Rejection> for Rejected {
    fn from_iter<I: IntoIterator<Item = Rejection>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl IntoIterator for Rejected {
    type Item = Rejection;
    type IntoIter = std::vec::IntoIter<Rejection>;

    fn into_iter(self) -> Self::IntoIter {
        self.rejections.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_preserves_order() {
        let rejected = Rejected::new(vec![
            Rejection::PathNotMatched,
            Rejection::MissingHeader {
                name: "x-token".into(),
            },
        ]);

        let mapped = rejected.map(|r| match r {
            Rejection::MissingHeader { name } => Rejection::Validation {
                message: format!("missing {name}"),
            },
            other => other,
        });

        assert_eq!(
            mapped.rejections(),
            &[
                Rejection::PathNotMatched,
                Rejection::Validation {
                    message: "missing x-token".into()
                }
            ]
        );
    }

    #[test]
    fn test_flat_map_can_drop_and_expand() {
        let rejected = Rejected::new(vec![
            Rejection::PathNotMatched,
            Rejection::MethodNotAllowed {
                supported: Method::GET,
            },
        ]);

        let expanded = rejected.flat_map(|r| match r {
            Rejection::PathNotMatched => vec![],
            Rejection::MethodNotAllowed { .. } => vec![
                Rejection::MethodNotAllowed {
                    supported: Method::GET,
                },
                Rejection::MethodNotAllowed {
                    supported: Method::HEAD,
                },
            ],
            other => vec![other],
        });

        assert_eq!(expanded.len(), 2);
        assert!(!expanded.rejections().contains(&Rejection::PathNotMatched));
    }

    #[test]
    fn test_concat_keeps_both_alternatives() {
        let first = Rejected::new(vec![
            Rejection::MethodNotAllowed {
                supported: Method::POST,
            },
            Rejection::PathNotMatched,
        ]);
        let second = Rejected::new(vec![Rejection::PathNotMatched]);

        let merged = first.concat(second);
        assert_eq!(merged.len(), 3);
        assert_eq!(merged.rejections()[2], Rejection::PathNotMatched);
    }

    #[test]
    fn test_empty_rejected() {
        let rejected = Rejected::default();
        assert!(rejected.is_empty());
        assert_eq!(rejected.into_rejections(), Vec::new());
    }
}
