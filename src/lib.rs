//! # routewire
//!
//! In-process request routing core built around an immutable request context.
//!
//! One in-flight HTTP request is a [`RequestContext`]. Route code transforms
//! it functionally (request, unmatched path, responder, and the eventual
//! response) and finally ends it with exactly one terminal operation:
//! complete, redirect, reject or fail. Every outcome is a [`RouteMessage`]
//! travelling outward through the responder pipeline.
//!
//! ## Architecture
//!
//! - **Context** ([`context`]): transformations and terminal operations
//! - **Responders** ([`responder`]): the message union, wrapping layers and
//!   the completion guard
//! - **Marshalling** ([`marshalling`]): type-keyed marshallers and content negotiation
//! - **Routes** ([`route`]): combinators, rejection and failure handlers
//! - **Dispatch** ([`Dispatcher`]): runs a sealed route on tokio
//!
//! ## Example
//!
//! ```
//! use http::{Method, StatusCode, Uri};
//! use routewire::model::HttpRequest;
//! use routewire::route::{method, path_prefix, route, RouteExt};
//! use routewire::{Dispatcher, RedirectionType};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let dispatcher = Dispatcher::builder()
//!         .route(
//!             path_prefix(
//!                 "hello",
//!                 method(Method::GET, route(|ctx| ctx.complete("hi".to_string()))),
//!             )
//!             .or(path_prefix(
//!                 "old",
//!                 route(|ctx| ctx.redirect("/hello", RedirectionType::Found)),
//!             )),
//!         )
//!         .build()?;
//!
//!     let response = dispatcher
//!         .dispatch(HttpRequest::get(Uri::from_static("/old")))?
//!         .into_response()
//!         .await?;
//!     assert_eq!(response.status, StatusCode::FOUND);
//!     Ok(())
//! }
//! ```

pub mod codec;
pub mod context;
pub mod error;
pub mod marshalling;
pub mod model;
pub mod rejection;
pub mod responder;
pub mod route;
pub mod settings;

mod dispatch;

pub use context::{RedirectionType, RequestContext, RequestResult};
pub use dispatch::{Dispatcher, DispatcherBuilder, ResponseStream};
pub use error::{Result, RouteError};
pub use rejection::{Rejected, Rejection};
pub use responder::{Responder, ResponderRef, RouteMessage};
pub use settings::RoutingSettings;
