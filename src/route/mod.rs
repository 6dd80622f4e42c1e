//! Routes and route combinators.
//!
//! A [`Route`] is a function from a [`RequestContext`] to the
//! [`RequestResult`] of the terminal operation it ends in. Combinators wrap
//! routes into new routes: filters reject what they don't match, [`RouteExt::or`]
//! tries an alternative when the first route rejects.
//!
//! # Example
//!
//! ```
//! use http::Method;
//! use routewire::route::{method, path_end, path_prefix, route, RouteExt};
//!
//! let api = path_prefix(
//!     "users",
//!     path_end(
//!         method(Method::GET, route(|ctx| ctx.complete("all users".to_string())))
//!             .or(method(Method::POST, route(|ctx| ctx.complete("created".to_string())))),
//!     ),
//! );
//! # let _ = api;
//! ```

mod handlers;

use std::sync::Arc;

use http::Method;

pub use handlers::{
    handle_failures, handle_rejections, seal, ExceptionHandler, RejectionHandler,
};

use crate::context::{RequestContext, RequestResult};
use crate::rejection::Rejection;

/// A route: consumes a context and ends in one terminal operation.
pub type Route = Arc<dyn Fn(RequestContext) -> RequestResult + Send + Sync>;

/// Wrap a closure as a [`Route`].
pub fn route<F>(f: F) -> Route
where
    F: Fn(RequestContext) -> RequestResult + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Combinators available on every route.
pub trait RouteExt {
    /// Run `self`; if it rejects, run `other` on the original context.
    ///
    /// Rejections of `other` are prefixed with those of `self`, so a rejection
    /// handler sees the rejections of every branch in order.
    fn or(self, other: Route) -> Route;
}

impl RouteExt for Route {
    fn or(self, other: Route) -> Route {
        route(move |ctx| {
            let fallback = ctx.clone();
            let other = other.clone();
            self(ctx.with_rejection_handling(move |rejected| {
                let earlier = rejected.into_rejections();
                let alternative = fallback.map_rejections(move |later| {
                    earlier.iter().cloned().chain(later).collect()
                });
                let _ = other(alternative);
            }))
        })
    }
}

/// Match one leading path segment and continue with the rest of the path.
///
/// `segment` matches `/segment` when it is followed by the end of the
/// unmatched path or by `/`. Anything else rejects with `PathNotMatched`.
pub fn path_prefix(segment: &str, inner: Route) -> Route {
    let prefix = format!("/{}", segment.trim_matches('/'));
    route(move |ctx| {
        let rest = ctx
            .unmatched_path()
            .strip_prefix(prefix.as_str())
            .filter(|rest| rest.is_empty() || rest.starts_with('/'))
            .map(str::to_string);

        match rest {
            Some(rest) => inner(ctx.map_unmatched_path(move |_| rest)),
            None => ctx.reject([Rejection::PathNotMatched]),
        }
    })
}

/// Pass only when the whole path has been matched.
pub fn path_end(inner: Route) -> Route {
    route(move |ctx| {
        if matches!(ctx.unmatched_path(), "" | "/") {
            inner(ctx)
        } else {
            ctx.reject([Rejection::PathNotMatched])
        }
    })
}

/// Pass only requests with the given method.
pub fn method(method: Method, inner: Route) -> Route {
    route(move |ctx| {
        if ctx.request().method == method {
            inner(ctx)
        } else {
            ctx.reject([Rejection::MethodNotAllowed {
                supported: method.clone(),
            }])
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::HttpRequest;
    use crate::rejection::Rejected;
    use crate::responder::{ChannelResponder, RouteMessage};
    use http::Uri;

    fn run(route: &Route, request: HttpRequest) -> Vec<RouteMessage> {
        let (responder, mut rx) = ChannelResponder::channel();
        let _ = route(RequestContext::new(request, responder));
        let mut out = Vec::new();
        while let Ok(envelope) = rx.try_recv() {
            out.push(envelope.message);
        }
        out
    }

    fn get(uri: &'static str) -> HttpRequest {
        HttpRequest::get(Uri::from_static(uri))
    }

    fn rejected(messages: &[RouteMessage]) -> &Rejected {
        match messages {
            [RouteMessage::Rejected(rejected)] => rejected,
            other => panic!("expected a single rejection, got {other:?}"),
        }
    }

    fn echo_path() -> Route {
        route(|ctx| {
            let path = ctx.unmatched_path().to_string();
            ctx.complete(path)
        })
    }

    #[test]
    fn test_path_prefix_consumes_segment() {
        let r = path_prefix("api", echo_path());
        match run(&r, get("/api/users")).as_slice() {
            [RouteMessage::Response(response)] => assert_eq!(response.entity.as_string(), "/users"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_path_prefix_requires_segment_boundary() {
        let r = path_prefix("api", echo_path());
        let out = run(&r, get("/apix"));
        assert_eq!(rejected(&out).rejections(), &[Rejection::PathNotMatched]);
    }

    #[test]
    fn test_path_end() {
        let r = path_prefix("a", path_end(echo_path()));

        assert!(matches!(run(&r, get("/a")).as_slice(), [RouteMessage::Response(_)]));
        assert!(matches!(run(&r, get("/a/")).as_slice(), [RouteMessage::Response(_)]));
        let out = run(&r, get("/a/b"));
        assert_eq!(rejected(&out).rejections(), &[Rejection::PathNotMatched]);
    }

    #[test]
    fn test_method_filter() {
        let r = method(Method::POST, echo_path());
        let out = run(&r, get("/"));
        assert_eq!(
            rejected(&out).rejections(),
            &[Rejection::MethodNotAllowed {
                supported: Method::POST
            }]
        );
    }

    #[test]
    fn test_or_takes_first_match() {
        let r = method(Method::GET, route(|ctx| ctx.complete("first".to_string())))
            .or(route(|ctx| ctx.complete("second".to_string())));

        match run(&r, get("/")).as_slice() {
            [RouteMessage::Response(response)] => assert_eq!(response.entity.as_string(), "first"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_or_falls_back_on_original_context() {
        let r = path_prefix("x", echo_path()).or(echo_path());

        match run(&r, get("/y/z")).as_slice() {
            [RouteMessage::Response(response)] => assert_eq!(response.entity.as_string(), "/y/z"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_or_aggregates_rejections_in_order() {
        let r = method(Method::PUT, echo_path())
            .or(method(Method::DELETE, echo_path()))
            .or(route(|ctx| ctx.reject([Rejection::PathNotMatched])));

        let out = run(&r, get("/"));
        assert_eq!(
            rejected(&out).rejections(),
            &[
                Rejection::MethodNotAllowed {
                    supported: Method::PUT
                },
                Rejection::MethodNotAllowed {
                    supported: Method::DELETE
                },
                Rejection::PathNotMatched,
            ]
        );
    }

    #[test]
    fn test_or_passes_failures_through() {
        let r = route(|ctx| ctx.fail_with("broken")).or(echo_path());
        assert!(matches!(run(&r, get("/")).as_slice(), [RouteMessage::Failure(_)]));
    }
}
