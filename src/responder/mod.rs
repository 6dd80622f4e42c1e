//! Responder module - where route outcomes go.
//!
//! A [`Responder`] accepts one [`RouteMessage`] at a time. Route code never
//! talks to the transport directly: it sends to the responder held by its
//! [`RequestContext`](crate::RequestContext), which is usually a stack of
//! wrapping layers around the responder the boundary layer created.
//!
//! ```text
//! route ─► layer N ─► ... ─► layer 1 ─► CompletionGuard ─► ChannelResponder ─► caller
//! ```
//!
//! The layer applied last sees each message first.
//!
//! Provides:
//! - [`RouteMessage`] / [`Envelope`] - the closed message union
//! - wrapping layers ([`MapResponder`], [`FlatMapResponder`], [`InterceptResponder`],
//!   [`DefaultSenderResponder`])
//! - [`CompletionGuard`] - at-most-once completion at the root
//! - [`ChannelResponder`] and [`FnResponder`] - concrete endpoints

mod channel;
mod guard;
mod layers;
mod message;

use std::sync::Arc;

pub use channel::{responder_fn, ChannelResponder, FnResponder};
pub use guard::CompletionGuard;
pub use layers::{
    DefaultSenderResponder, FlatMapResponder, Intercept, InterceptResponder, MapResponder,
};
pub use message::{Envelope, Failure, RouteMessage};

/// Receiver of route outcomes.
///
/// `tell` must not block: it is called from inside route code and from other
/// responders. Implementations must be thread-safe; the pipeline may be driven
/// from any task.
pub trait Responder: Send + Sync + 'static {
    /// Deliver one message, optionally on behalf of `sender`.
    fn tell(&self, message: RouteMessage, sender: Option<ResponderRef>);
}

/// Shared handle to a responder.
pub type ResponderRef = Arc<dyn Responder>;
