//! The immutable request context.

use std::any::type_name;
use std::sync::Arc;

use http::header::{HeaderValue, LOCATION};
use http::{HeaderMap, StatusCode};

use super::RedirectionType;
use crate::error::{BoxError, RouteError};
use crate::marshalling::{Marshaller, MarshallerRegistry, MarshallingContext};
use crate::model::{HttpEntity, HttpRequest, HttpResponse};
use crate::rejection::{Rejected, Rejection};
use crate::responder::{
    CompletionGuard, DefaultSenderResponder, Failure, FlatMapResponder, Intercept,
    InterceptResponder, MapResponder, Responder, ResponderRef, RouteMessage,
};

/// Marker returned by every terminal operation.
///
/// A route that returns it has taken responsibility for the request: either a
/// message has been sent, or the context was handed to code that will send
/// one later ([`RequestResult::deferred`]).
#[must_use = "a route must return the RequestResult of the terminal operation it called"]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestResult {
    _private: (),
}

impl RequestResult {
    pub(crate) const HANDLED: RequestResult = RequestResult { _private: () };

    /// The context was moved to another task that will complete it.
    pub const fn deferred() -> Self {
        Self::HANDLED
    }
}

/// One in-flight request.
///
/// Transformations take `&self` and return a new context, leaving the original
/// usable. Terminal operations consume the context and send exactly one
/// message to its responder.
///
/// `RequestContext` is cheap to clone: every field is reference counted.
///
/// # Example
///
/// ```
/// use http::{StatusCode, Uri};
/// use routewire::model::HttpRequest;
/// use routewire::responder::{ChannelResponder, RouteMessage};
/// use routewire::RequestContext;
///
/// let (responder, mut rx) = ChannelResponder::channel();
/// let ctx = RequestContext::new(HttpRequest::get(Uri::from_static("/hello")), responder);
///
/// let _ = ctx
///     .map_http_response(|mut response| {
///         response.status = StatusCode::ACCEPTED;
///         response
///     })
///     .complete("hi".to_string());
///
/// match rx.try_recv().unwrap().message {
///     RouteMessage::Response(response) => assert_eq!(response.status, StatusCode::ACCEPTED),
///     other => panic!("unexpected {other:?}"),
/// }
/// ```
#[derive(Clone)]
pub struct RequestContext {
    request: Arc<HttpRequest>,
    responder: ResponderRef,
    unmatched_path: Arc<str>,
    marshallers: Arc<MarshallerRegistry>,
}

impl RequestContext {
    /// Create the context for a new request.
    ///
    /// The responder is wrapped in a [`CompletionGuard`] so at most one
    /// outcome reaches it.
    pub fn new(request: HttpRequest, responder: ResponderRef) -> Self {
        let unmatched_path = Arc::from(request.path());
        Self {
            request: Arc::new(request),
            responder: Arc::new(CompletionGuard::new(responder)),
            unmatched_path,
            marshallers: MarshallerRegistry::shared_defaults(),
        }
    }

    /// Use the given registry for `complete*` lookups.
    pub fn with_marshallers(&self, marshallers: Arc<MarshallerRegistry>) -> Self {
        Self {
            marshallers,
            ..self.clone()
        }
    }

    /// The request being routed.
    #[inline]
    pub fn request(&self) -> &HttpRequest {
        &self.request
    }

    /// The responder this context sends its outcome to.
    #[inline]
    pub fn responder(&self) -> &ResponderRef {
        &self.responder
    }

    /// Suffix of the request path not yet consumed by route matching.
    #[inline]
    pub fn unmatched_path(&self) -> &str {
        &self.unmatched_path
    }

    /// Marshallers available to `complete`.
    #[inline]
    pub fn marshallers(&self) -> &Arc<MarshallerRegistry> {
        &self.marshallers
    }

    /// Whether both contexts share every field by pointer.
    pub fn ptr_eq(&self, other: &RequestContext) -> bool {
        Arc::ptr_eq(&self.request, &other.request)
            && Arc::ptr_eq(&self.responder, &other.responder)
            && Arc::ptr_eq(&self.unmatched_path, &other.unmatched_path)
            && Arc::ptr_eq(&self.marshallers, &other.marshallers)
    }

    // ---- transformations ----

    /// Replace the request with `f(request)`.
    ///
    /// If the result equals the current request the context is returned as is.
    pub fn map_request<F>(&self, f: F) -> Self
    where
        F: FnOnce(&HttpRequest) -> HttpRequest,
    {
        let request = f(&self.request);
        if request == *self.request {
            return self.clone();
        }
        Self {
            request: Arc::new(request),
            ..self.clone()
        }
    }

    /// Replace the responder with `f(responder)`.
    pub fn map_responder<F>(&self, f: F) -> Self
    where
        F: FnOnce(ResponderRef) -> ResponderRef,
    {
        let responder = f(self.responder.clone());
        if Arc::ptr_eq(&responder, &self.responder) {
            return self.clone();
        }
        Self {
            responder,
            ..self.clone()
        }
    }

    /// Replace the unmatched path with `f(unmatched_path)`.
    pub fn map_unmatched_path<F>(&self, f: F) -> Self
    where
        F: FnOnce(&str) -> String,
    {
        let path = f(&self.unmatched_path);
        if *path == *self.unmatched_path {
            return self.clone();
        }
        Self {
            unmatched_path: Arc::from(path),
            ..self.clone()
        }
    }

    /// Forward every outgoing message as `f(message)`.
    pub fn map_route_response<F>(&self, f: F) -> Self
    where
        F: Fn(RouteMessage) -> RouteMessage + Send + Sync + 'static,
    {
        self.map_responder(|inner| Arc::new(MapResponder::new(inner, f)))
    }

    /// Expand every outgoing message into `f(message)`, forwarded in order.
    pub fn flat_map_route_response<F>(&self, f: F) -> Self
    where
        F: Fn(RouteMessage) -> Vec<RouteMessage> + Send + Sync + 'static,
    {
        self.map_responder(|inner| Arc::new(FlatMapResponder::new(inner, f)))
    }

    /// Like [`map_route_response`](Self::map_route_response), but `f` may
    /// decline a message by returning `None`, which forwards it unchanged.
    pub fn map_route_response_pf<F>(&self, f: F) -> Self
    where
        F: Fn(&RouteMessage) -> Option<RouteMessage> + Send + Sync + 'static,
    {
        self.map_route_response(move |message| f(&message).unwrap_or(message))
    }

    /// Like [`flat_map_route_response`](Self::flat_map_route_response), but a
    /// declined message is forwarded on its own.
    pub fn flat_map_route_response_pf<F>(&self, f: F) -> Self
    where
        F: Fn(&RouteMessage) -> Option<Vec<RouteMessage>> + Send + Sync + 'static,
    {
        self.flat_map_route_response(move |message| f(&message).unwrap_or_else(|| vec![message]))
    }

    /// Transform the response carried by `Response` and `ChunkedStart` messages.
    pub fn map_http_response<F>(&self, f: F) -> Self
    where
        F: Fn(HttpResponse) -> HttpResponse + Send + Sync + 'static,
    {
        self.map_route_response(move |message| match message {
            RouteMessage::Response(response) => RouteMessage::Response(f(response)),
            RouteMessage::ChunkedStart(response) => RouteMessage::ChunkedStart(f(response)),
            other => other,
        })
    }

    /// Transform only the entity of outgoing responses.
    pub fn map_http_response_entity<F>(&self, f: F) -> Self
    where
        F: Fn(HttpEntity) -> HttpEntity + Send + Sync + 'static,
    {
        self.map_http_response(move |response| HttpResponse {
            entity: f(response.entity),
            ..response
        })
    }

    /// Transform only the headers of outgoing responses.
    pub fn map_http_response_headers<F>(&self, f: F) -> Self
    where
        F: Fn(HeaderMap) -> HeaderMap + Send + Sync + 'static,
    {
        self.map_http_response(move |response| HttpResponse {
            headers: f(response.headers),
            ..response
        })
    }

    /// Transform the rejection list of outgoing `Rejected` messages.
    pub fn map_rejections<F>(&self, f: F) -> Self
    where
        F: Fn(Vec<Rejection>) -> Vec<Rejection> + Send + Sync + 'static,
    {
        self.map_route_response(move |message| match message {
            RouteMessage::Rejected(rejected) => {
                RouteMessage::Rejected(Rejected::new(f(rejected.into_rejections())))
            }
            other => other,
        })
    }

    /// Let `f` consume outgoing messages; passed messages are forwarded.
    pub fn with_route_response_handling<F>(&self, f: F) -> Self
    where
        F: Fn(RouteMessage) -> Intercept + Send + Sync + 'static,
    {
        self.map_responder(|inner| Arc::new(InterceptResponder::new(inner, f)))
    }

    /// Consume `Rejected` messages with `f`; everything else is forwarded.
    pub fn with_rejection_handling<F>(&self, f: F) -> Self
    where
        F: Fn(Rejected) + Send + Sync + 'static,
    {
        self.with_route_response_handling(move |message| match message {
            RouteMessage::Rejected(rejected) => {
                f(rejected);
                Intercept::Handled
            }
            other => Intercept::Pass(other),
        })
    }

    /// Consume `Failure` messages with `f`; everything else is forwarded.
    pub fn with_failure_handling<F>(&self, f: F) -> Self
    where
        F: Fn(Failure) + Send + Sync + 'static,
    {
        self.with_route_response_handling(move |message| match message {
            RouteMessage::Failure(failure) => {
                f(failure);
                Intercept::Handled
            }
            other => Intercept::Pass(other),
        })
    }

    /// Attach `sender` to every message sent without one.
    pub fn with_default_sender(&self, sender: ResponderRef) -> Self {
        self.map_responder(|inner| Arc::new(DefaultSenderResponder::new(inner, sender)))
    }

    // ---- terminal operations ----

    /// Decline the request.
    pub fn reject<I>(self, rejections: I) -> RequestResult
    where
        I: IntoIterator<Item = Rejection>,
    {
        self.tell(RouteMessage::Rejected(rejections.into_iter().collect()))
    }

    /// Redirect to `uri` with the given redirection status.
    ///
    /// The response carries a `Location` header and, if the redirection type
    /// has one, an HTML body linking to the target. A `uri` that is not a
    /// legal header value fails the request.
    pub fn redirect(self, uri: &str, redirection_type: RedirectionType) -> RequestResult {
        let location = match HeaderValue::from_str(uri) {
            Ok(location) => location,
            Err(e) => return self.fail_with(RouteError::from(e)),
        };

        let mut headers = HeaderMap::new();
        headers.insert(LOCATION, location);

        let entity = redirection_type
            .render_body(uri)
            .map(HttpEntity::html)
            .unwrap_or_default();

        self.complete_response(HttpResponse {
            status: redirection_type.status(),
            headers,
            entity,
        })
    }

    /// Complete with `200 OK`, marshalling `value` with the registered marshaller.
    pub fn complete<T: 'static>(self, value: T) -> RequestResult {
        self.complete_with_status(StatusCode::OK, value)
    }

    /// Complete with the given status, marshalling `value`.
    pub fn complete_with_status<T: 'static>(self, status: StatusCode, value: T) -> RequestResult {
        self.complete_with_headers(status, HeaderMap::new(), value)
    }

    /// Complete with the given status and headers, marshalling `value`.
    ///
    /// The marshaller registered for `T` negotiates the content type and
    /// calls back into the [`MarshallingContext`]. Without a registered
    /// marshaller the request fails with [`RouteError::MarshallerNotFound`].
    pub fn complete_with_headers<T: 'static>(
        self,
        status: StatusCode,
        headers: HeaderMap,
        value: T,
    ) -> RequestResult {
        match self.marshallers.lookup::<T>() {
            Some(marshaller) => {
                marshaller.marshal(&value, self.marshalling_context(status, headers))
            }
            None => self.fail_with(RouteError::MarshallerNotFound(type_name::<T>())),
        }
    }

    /// Complete with `200 OK` using an explicit marshaller.
    pub fn complete_with<T, M>(self, marshaller: &M, value: &T) -> RequestResult
    where
        T: ?Sized,
        M: Marshaller<T> + ?Sized,
    {
        marshaller.marshal(
            value,
            self.marshalling_context(StatusCode::OK, HeaderMap::new()),
        )
    }

    /// Complete with a fully formed response.
    pub fn complete_response(self, response: HttpResponse) -> RequestResult {
        self.tell(RouteMessage::Response(response))
    }

    /// Fail the request; an upstream failure handler turns this into a response.
    pub fn fail_with(self, error: impl Into<BoxError>) -> RequestResult {
        self.tell(RouteMessage::Failure(Failure::new(error)))
    }

    /// Capability handed to marshallers for the given status and headers.
    pub fn marshalling_context(self, status: StatusCode, headers: HeaderMap) -> MarshallingContext {
        MarshallingContext::new(self, status, headers)
    }

    pub(crate) fn tell(self, message: RouteMessage) -> RequestResult {
        self.responder.tell(message, None);
        RequestResult::HANDLED
    }
}
