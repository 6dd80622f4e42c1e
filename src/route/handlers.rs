//! Rendering rejections and failures into responses.
//!
//! A sealed route never lets a `Rejected` or `Failure` message reach the
//! boundary: [`handle_rejections`] turns rejections into client errors and
//! [`handle_failures`] turns failures into server errors.

use std::fmt::Write as _;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use http::header::{HeaderValue, ALLOW};
use http::{HeaderMap, Method, StatusCode};

use super::{route, Route};
use crate::model::{ContentType, HttpEntity, HttpResponse};
use crate::rejection::Rejection;
use crate::responder::{Failure, Intercept, RouteMessage};
use crate::settings::RoutingSettings;

type RejectionFn = dyn Fn(&[Rejection]) -> Option<HttpResponse> + Send + Sync;
type FailureFn = dyn Fn(&Failure) -> Option<HttpResponse> + Send + Sync;

/// Turns a list of rejections into a response.
///
/// Returning `None` leaves the rejections unhandled; they travel on as a
/// `Rejected` message.
#[derive(Clone)]
pub struct RejectionHandler(Arc<RejectionFn>);

impl RejectionHandler {
    /// Wrap a function that may render a rejection list.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&[Rejection]) -> Option<HttpResponse> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Render `rejections`, or `None` to leave them unhandled.
    pub fn apply(&self, rejections: &[Rejection]) -> Option<HttpResponse> {
        (self.0)(rejections)
    }

    /// Try `self`, then `fallback` for rejections `self` leaves unhandled.
    pub fn or_else(self, fallback: RejectionHandler) -> Self {
        Self::new(move |rejections| self.apply(rejections).or_else(|| fallback.apply(rejections)))
    }
}

impl Default for RejectionHandler {
    /// Renders every rejection list; unmatched paths and empty lists become 404.
    fn default() -> Self {
        Self::new(|rejections| Some(default_rejection_response(rejections)))
    }
}

fn plain(status: StatusCode, message: impl Into<String>) -> HttpResponse {
    HttpResponse::new(status).with_entity(HttpEntity::text(message))
}

fn join_content_types(types: &[ContentType], separator: &str) -> String {
    types
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(separator)
}

/// Collect the payloads of one rejection kind, skipping duplicates.
fn collect_unique<T: PartialEq>(
    rejections: &[Rejection],
    pick: impl Fn(&Rejection) -> Option<Vec<T>>,
) -> Vec<T> {
    let mut out = Vec::new();
    for item in rejections.iter().filter_map(pick).flatten() {
        if !out.contains(&item) {
            out.push(item);
        }
    }
    out
}

fn default_rejection_response(rejections: &[Rejection]) -> HttpResponse {
    if let Some((name, message)) = rejections.iter().find_map(|r| match r {
        Rejection::MalformedHeader { name, message } => Some((name, message)),
        _ => None,
    }) {
        return plain(
            StatusCode::BAD_REQUEST,
            format!("The value of HTTP header '{name}' was malformed:\n{message}"),
        );
    }

    let methods: Vec<Method> = collect_unique(rejections, |r| match r {
        Rejection::MethodNotAllowed { supported } => Some(vec![supported.clone()]),
        _ => None,
    });
    if !methods.is_empty() {
        let allowed = methods
            .iter()
            .map(Method::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        let mut headers = HeaderMap::new();
        if let Ok(value) = HeaderValue::from_str(&allowed) {
            headers.insert(ALLOW, value);
        }
        return plain(
            StatusCode::METHOD_NOT_ALLOWED,
            format!("HTTP method not allowed, supported methods: {allowed}"),
        )
        .with_headers(headers);
    }

    if let Some(name) = rejections.iter().find_map(|r| match r {
        Rejection::MissingHeader { name } => Some(name),
        _ => None,
    }) {
        return plain(
            StatusCode::BAD_REQUEST,
            format!("Request is missing required HTTP header '{name}'"),
        );
    }

    let acceptable: Vec<ContentType> = collect_unique(rejections, |r| match r {
        Rejection::UnacceptedResponseContentType { supported } => Some(supported.clone()),
        _ => None,
    });
    if !acceptable.is_empty() {
        return plain(
            StatusCode::NOT_ACCEPTABLE,
            format!(
                "Resource representation is only available with these Content-Types:\n{}",
                join_content_types(&acceptable, "\n")
            ),
        );
    }

    let supported: Vec<ContentType> = collect_unique(rejections, |r| match r {
        Rejection::UnsupportedRequestContentType { supported } => Some(supported.clone()),
        _ => None,
    });
    if !supported.is_empty() {
        return plain(
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            format!(
                "There was a problem with the request's Content-Type:\nExpected '{}'",
                join_content_types(&supported, "' or '")
            ),
        );
    }

    if let Some(message) = rejections.iter().find_map(|r| match r {
        Rejection::Validation { message } => Some(message),
        _ => None,
    }) {
        return plain(StatusCode::BAD_REQUEST, message.clone());
    }

    if let Some(message) = rejections.iter().find_map(|r| match r {
        Rejection::Custom { message, .. } => Some(message),
        _ => None,
    }) {
        return plain(StatusCode::BAD_REQUEST, message.clone());
    }

    plain(
        StatusCode::NOT_FOUND,
        "The requested resource could not be found.",
    )
}

/// Turns a failure into a response.
#[derive(Clone)]
pub struct ExceptionHandler(Arc<FailureFn>);

impl ExceptionHandler {
    /// Wrap a function that may render a failure.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Failure) -> Option<HttpResponse> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// 500 for every failure; with `verbose` the error text is appended.
    pub fn default_handler(verbose: bool) -> Self {
        Self::new(move |failure| {
            let mut message = String::from("There was an internal server error.");
            if verbose {
                let _ = write!(message, "\n{failure}");
            }
            Some(plain(StatusCode::INTERNAL_SERVER_ERROR, message))
        })
    }

    /// Render `failure`, or `None` to leave it unhandled.
    pub fn apply(&self, failure: &Failure) -> Option<HttpResponse> {
        (self.0)(failure)
    }
}

impl Default for ExceptionHandler {
    fn default() -> Self {
        Self::default_handler(false)
    }
}

/// Render rejections of `inner` with `handler`.
pub fn handle_rejections(handler: RejectionHandler, inner: Route) -> Route {
    route(move |ctx| {
        let outer = ctx.clone();
        let handler = handler.clone();
        inner(ctx.with_rejection_handling(move |rejected| {
            let outer = outer.clone();
            let _ = match handler.apply(rejected.rejections()) {
                Some(response) => outer.complete_response(response),
                None => outer.tell(RouteMessage::Rejected(rejected)),
            };
        }))
    })
}

/// Render failures of `inner` with `handler`, logging each one.
///
/// A failure after a chunked response has started cannot become a response
/// any more; it is passed on so the stream is aborted.
pub fn handle_failures(handler: ExceptionHandler, inner: Route) -> Route {
    route(move |ctx| {
        let outer = ctx.clone();
        let handler = handler.clone();
        let streaming = AtomicBool::new(false);

        inner(ctx.with_route_response_handling(move |message| match message {
            RouteMessage::ChunkedStart(_) => {
                streaming.store(true, Ordering::Release);
                Intercept::Pass(message)
            }
            RouteMessage::Failure(failure) => {
                let request = outer.request();
                tracing::error!(
                    "Error during processing of request {} {}: {}",
                    request.method,
                    request.uri,
                    failure
                );
                if streaming.load(Ordering::Acquire) {
                    return Intercept::Pass(RouteMessage::Failure(failure));
                }
                match handler.apply(&failure) {
                    Some(response) => {
                        let _ = outer.clone().complete_response(response);
                        Intercept::Handled
                    }
                    None => Intercept::Pass(RouteMessage::Failure(failure)),
                }
            }
            other => Intercept::Pass(other),
        }))
    })
}

/// Wrap `inner` so every rejection and failure becomes a response.
pub fn seal(settings: &RoutingSettings, inner: Route) -> Route {
    handle_failures(
        ExceptionHandler::default_handler(settings.verbose_error_messages),
        handle_rejections(RejectionHandler::default(), inner),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::RequestContext;
    use crate::model::HttpRequest;
    use crate::responder::ChannelResponder;
    use http::Uri;

    fn respond(route: &Route) -> HttpResponse {
        let (responder, mut rx) = ChannelResponder::channel();
        let _ = route(RequestContext::new(
            HttpRequest::get(Uri::from_static("/")),
            responder,
        ));
        let message = rx.try_recv().unwrap().message;
        assert!(rx.try_recv().is_err(), "more than one message sent");
        match message {
            RouteMessage::Response(response) => response,
            other => panic!("expected response, got {other:?}"),
        }
    }

    fn rejecting(rejections: Vec<Rejection>) -> Route {
        route(move |ctx| ctx.reject(rejections.clone()))
    }

    #[test]
    fn test_empty_rejections_are_not_found() {
        let response = default_rejection_response(&[]);
        assert_eq!(response.status, StatusCode::NOT_FOUND);
        assert_eq!(
            response.entity.as_string(),
            "The requested resource could not be found."
        );
    }

    #[test]
    fn test_method_rejections_union_allow_header() {
        let response = default_rejection_response(&[
            Rejection::MethodNotAllowed {
                supported: Method::GET,
            },
            Rejection::PathNotMatched,
            Rejection::MethodNotAllowed {
                supported: Method::PUT,
            },
            Rejection::MethodNotAllowed {
                supported: Method::GET,
            },
        ]);

        assert_eq!(response.status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers[ALLOW], "GET, PUT");
    }

    #[test]
    fn test_malformed_header_wins() {
        let response = default_rejection_response(&[
            Rejection::MethodNotAllowed {
                supported: Method::GET,
            },
            Rejection::MalformedHeader {
                name: "x-id".into(),
                message: "not a number".into(),
            },
        ]);

        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert!(response.entity.as_string().contains("'x-id'"));
    }

    #[test]
    fn test_unaccepted_content_type_is_406() {
        let response = default_rejection_response(&[
            Rejection::UnacceptedResponseContentType {
                supported: vec![ContentType::APPLICATION_JSON],
            },
            Rejection::UnacceptedResponseContentType {
                supported: vec![ContentType::TEXT_PLAIN_UTF8, ContentType::APPLICATION_JSON],
            },
        ]);

        assert_eq!(response.status, StatusCode::NOT_ACCEPTABLE);
        let body = response.entity.as_string();
        assert_eq!(body.matches("application/json").count(), 1);
        assert!(body.contains("text/plain"));
    }

    #[test]
    fn test_remaining_statuses() {
        let cases = [
            (
                Rejection::MissingHeader {
                    name: "authorization".into(),
                },
                StatusCode::BAD_REQUEST,
            ),
            (
                Rejection::UnsupportedRequestContentType {
                    supported: vec![ContentType::APPLICATION_JSON],
                },
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ),
            (
                Rejection::Validation {
                    message: "age must be positive".into(),
                },
                StatusCode::BAD_REQUEST,
            ),
            (
                Rejection::Custom {
                    name: "quota".into(),
                    message: "quota exhausted".into(),
                },
                StatusCode::BAD_REQUEST,
            ),
            (Rejection::PathNotMatched, StatusCode::NOT_FOUND),
        ];

        for (rejection, status) in cases {
            assert_eq!(default_rejection_response(&[rejection]).status, status);
        }
    }

    #[test]
    fn test_handle_rejections_renders() {
        let r = handle_rejections(
            RejectionHandler::default(),
            rejecting(vec![Rejection::PathNotMatched]),
        );
        assert_eq!(respond(&r).status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_rejection_handler_or_else() {
        let only_validation = RejectionHandler::new(|rejections| {
            rejections.iter().find_map(|r| match r {
                Rejection::Validation { .. } => {
                    Some(HttpResponse::new(StatusCode::UNPROCESSABLE_ENTITY))
                }
                _ => None,
            })
        });
        let handler = only_validation.or_else(RejectionHandler::default());

        let validation = [Rejection::Validation {
            message: "bad".into(),
        }];
        assert_eq!(
            handler.apply(&validation).unwrap().status,
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            handler.apply(&[Rejection::PathNotMatched]).unwrap().status,
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_unhandled_rejections_pass_through() {
        let r = handle_rejections(
            RejectionHandler::new(|_| None),
            rejecting(vec![Rejection::PathNotMatched]),
        );

        let (responder, mut rx) = ChannelResponder::channel();
        let _ = r(RequestContext::new(
            HttpRequest::get(Uri::from_static("/")),
            responder,
        ));
        assert!(matches!(
            rx.try_recv().unwrap().message,
            RouteMessage::Rejected(_)
        ));
    }

    #[test]
    fn test_handle_failures_hides_error_text() {
        let r = handle_failures(
            ExceptionHandler::default(),
            route(|ctx| ctx.fail_with("secret detail")),
        );

        let response = respond(&r);
        assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            response.entity.as_string(),
            "There was an internal server error."
        );
    }

    #[test]
    fn test_verbose_failures_include_error_text() {
        let settings = RoutingSettings {
            verbose_error_messages: true,
            ..RoutingSettings::default()
        };
        let r = seal(&settings, route(|ctx| ctx.fail_with("disk full")));

        assert!(respond(&r).entity.as_string().ends_with("disk full"));
    }

    #[test]
    fn test_failure_after_chunked_start_aborts_stream() {
        let r = handle_failures(
            ExceptionHandler::default(),
            route(|ctx| {
                let failing = ctx.clone();
                let mctx = ctx.marshalling_context(StatusCode::OK, HeaderMap::new());
                let _responder = mctx.start_chunked_message(HttpEntity::text("partial"));
                failing.fail_with("stream broke")
            }),
        );

        let (responder, mut rx) = ChannelResponder::channel();
        let _ = r(RequestContext::new(
            HttpRequest::get(Uri::from_static("/")),
            responder,
        ));

        assert_eq!(rx.try_recv().unwrap().message.kind(), "chunked-start");
        assert_eq!(rx.try_recv().unwrap().message.kind(), "failure");
    }

    #[test]
    fn test_seal_renders_rejections() {
        let r = seal(
            &RoutingSettings::default(),
            rejecting(vec![Rejection::MethodNotAllowed {
                supported: Method::POST,
            }]),
        );
        assert_eq!(respond(&r).status, StatusCode::METHOD_NOT_ALLOWED);
    }
}
