//! Request contexts and their terminal outcomes.

mod redirection;
mod request_context;

pub use redirection::RedirectionType;
pub use request_context::{RequestContext, RequestResult};
