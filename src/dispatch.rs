//! Dispatcher builder and request runner.
//!
//! The [`DispatcherBuilder`] collects the route, marshallers and settings.
//! The [`Dispatcher`] is the boundary between a server and the routing core:
//! 1. Build a [`RequestContext`] around a channel responder
//! 2. Run the sealed route on a tokio task, bounded by a semaphore
//! 3. Hand the caller a [`ResponseStream`] of outgoing messages
//!
//! # Example
//!
//! ```
//! use http::{StatusCode, Uri};
//! use routewire::model::HttpRequest;
//! use routewire::route::{path_prefix, route};
//! use routewire::Dispatcher;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let dispatcher = Dispatcher::builder()
//!         .route(path_prefix("ping", route(|ctx| ctx.complete("pong".to_string()))))
//!         .build()?;
//!
//!     let response = dispatcher
//!         .dispatch(HttpRequest::get(Uri::from_static("/ping")))?
//!         .into_response()
//!         .await?;
//!     assert_eq!(response.status, StatusCode::OK);
//!
//!     let missing = dispatcher
//!         .dispatch(HttpRequest::get(Uri::from_static("/nope")))?
//!         .into_response()
//!         .await?;
//!     assert_eq!(missing.status, StatusCode::NOT_FOUND);
//!     Ok(())
//! }
//! ```

use std::sync::Arc;

use bytes::BytesMut;
use http::header::CONTENT_TYPE;
use tokio::sync::{mpsc, Semaphore};

use crate::context::RequestContext;
use crate::error::{Result, RouteError};
use crate::marshalling::{Marshaller, MarshallerRegistry};
use crate::model::{ContentType, HttpEntity, HttpRequest, HttpResponse};
use crate::responder::{ChannelResponder, Envelope, RouteMessage};
use crate::route::{seal, Route};
use crate::settings::RoutingSettings;

/// Builder for configuring and creating a [`Dispatcher`].
pub struct DispatcherBuilder {
    route: Option<Route>,
    marshallers: MarshallerRegistry,
    settings: RoutingSettings,
}

impl DispatcherBuilder {
    /// Create a builder with the default marshallers and settings.
    pub fn new() -> Self {
        Self {
            route: None,
            marshallers: MarshallerRegistry::with_defaults(),
            settings: RoutingSettings::default(),
        }
    }

    /// Set the route every request runs through. It is sealed on `build`.
    pub fn route(mut self, route: Route) -> Self {
        self.route = Some(route);
        self
    }

    /// Register a marshaller for values of type `T`.
    pub fn marshaller<T, M>(mut self, marshaller: M) -> Self
    where
        T: ?Sized + 'static,
        M: Marshaller<T>,
    {
        self.marshallers.register::<T, M>(marshaller);
        self
    }

    /// Replace the marshaller registry entirely.
    pub fn marshallers(mut self, marshallers: MarshallerRegistry) -> Self {
        self.marshallers = marshallers;
        self
    }

    /// Replace all settings.
    pub fn settings(mut self, settings: RoutingSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Set the maximum number of requests running at once.
    ///
    /// When this limit is reached, `dispatch` refuses new requests.
    /// Default: 256
    pub fn max_concurrent_requests(mut self, limit: usize) -> Self {
        self.settings.max_concurrent_requests = limit;
        self
    }

    /// Include error text in 500 responses.
    ///
    /// Default: false
    pub fn verbose_error_messages(mut self, verbose: bool) -> Self {
        self.settings.verbose_error_messages = verbose;
        self
    }

    /// Seal the route and build the dispatcher.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::Config`] without a route or with invalid settings.
    pub fn build(self) -> Result<Dispatcher> {
        let route = self
            .route
            .ok_or_else(|| RouteError::Config("no route configured".to_string()))?;
        self.settings.validate()?;

        Ok(Dispatcher {
            route: seal(&self.settings, route),
            marshallers: Arc::new(self.marshallers),
            semaphore: Arc::new(Semaphore::new(self.settings.max_concurrent_requests)),
            settings: self.settings,
        })
    }
}

impl Default for DispatcherBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Runs requests through a sealed route.
///
/// `Dispatcher` is cheap to share behind an `Arc`; `dispatch` takes `&self`.
pub struct Dispatcher {
    route: Route,
    marshallers: Arc<MarshallerRegistry>,
    semaphore: Arc<Semaphore>,
    settings: RoutingSettings,
}

impl Dispatcher {
    /// Create a new dispatcher builder.
    pub fn builder() -> DispatcherBuilder {
        DispatcherBuilder::new()
    }

    /// Start handling `request` on a tokio task.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::CapacityExceeded`] when the concurrency limit is
    /// reached.
    pub fn dispatch(&self, request: HttpRequest) -> Result<ResponseStream> {
        let permit = match self.semaphore.clone().try_acquire_owned() {
            Ok(permit) => permit,
            Err(_) => {
                tracing::warn!(
                    "Request capacity reached, refusing {} {}",
                    request.method,
                    request.uri
                );
                return Err(RouteError::CapacityExceeded(
                    self.settings.max_concurrent_requests,
                ));
            }
        };

        let (responder, rx) = ChannelResponder::channel();
        let ctx = RequestContext::new(request, responder)
            .with_marshallers(self.marshallers.clone());
        let route = self.route.clone();

        tokio::spawn(async move {
            // Permit is held until the route returns
            let _permit = permit;
            let _ = route(ctx);
        });

        Ok(ResponseStream { rx })
    }

    /// Number of requests that can still be dispatched right now.
    pub fn available_capacity(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// Settings the route was sealed with.
    pub fn settings(&self) -> &RoutingSettings {
        &self.settings
    }
}

/// The messages one request sends, in order.
pub struct ResponseStream {
    rx: mpsc::UnboundedReceiver<Envelope>,
}

impl ResponseStream {
    /// Next outgoing message, or `None` once every sender is gone.
    pub async fn next(&mut self) -> Option<RouteMessage> {
        self.rx.recv().await.map(|envelope| envelope.message)
    }

    /// Next message together with its sender.
    pub async fn next_envelope(&mut self) -> Option<Envelope> {
        self.rx.recv().await
    }

    /// Wait for the complete response.
    ///
    /// A chunked response is aggregated into a single entity with the content
    /// type of its start message; trailer headers are merged into the headers.
    ///
    /// # Errors
    ///
    /// - [`RouteError::Rejected`] / [`RouteError::Failed`] when the route's
    ///   rejection or failure was left unhandled
    /// - [`RouteError::NoResponse`] when the request ended without a response
    pub async fn into_response(mut self) -> Result<HttpResponse> {
        let mut response = match self.next().await {
            Some(RouteMessage::Response(response)) => return Ok(response),
            Some(RouteMessage::ChunkedStart(response)) => response,
            Some(RouteMessage::Rejected(rejected)) => return Err(RouteError::Rejected(rejected)),
            Some(RouteMessage::Failure(failure)) => {
                return Err(RouteError::Failed(failure.to_string()))
            }
            Some(other) => {
                tracing::debug!("Unexpected {} message before response start", other.kind());
                return Err(RouteError::NoResponse);
            }
            None => return Err(RouteError::NoResponse),
        };

        // an empty start entity announces the body's type in a header
        let content_type = match response.entity.content_type() {
            Some(content_type) => Some(content_type.clone()),
            None => response
                .headers
                .remove(CONTENT_TYPE)
                .and_then(|value| value.to_str().ok()?.parse::<ContentType>().ok()),
        };
        let mut body = BytesMut::from(&response.entity.data()[..]);

        loop {
            match self.next().await {
                Some(RouteMessage::Chunk(chunk)) => body.extend_from_slice(&chunk.data),
                Some(RouteMessage::ChunkedEnd(end)) => {
                    response.headers.extend(end.trailer);
                    break;
                }
                Some(RouteMessage::Failure(failure)) => {
                    return Err(RouteError::Failed(failure.to_string()))
                }
                Some(other) => {
                    tracing::debug!("Ignoring {} message inside chunked response", other.kind());
                }
                None => return Err(RouteError::NoResponse),
            }
        }

        response.entity = match content_type {
            Some(content_type) => HttpEntity::new(content_type, body.freeze()),
            None => HttpEntity::from(body.freeze()),
        };
        Ok(response)
    }
}
