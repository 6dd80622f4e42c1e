//! Marshalling - turning completed values into response entities.
//!
//! `complete*` does not build the response itself. It looks up the
//! [`Marshaller`] registered for the value's type and hands it a
//! [`MarshallingContext`]; the marshaller negotiates a content type with
//! [`MarshallingContext::try_accept`] and then calls exactly one terminal
//! operation on the context.
//!
//! ```text
//! ctx.complete(value)
//!   └─► registry.lookup::<T>() ─► marshaller.marshal(&value, mctx)
//!                                   ├─ mctx.marshal_to(entity)        ─► Response
//!                                   ├─ mctx.reject_marshalling(types) ─► Rejected
//!                                   ├─ mctx.handle_error(err)         ─► Failure
//!                                   └─ mctx.start_chunked_message(e)  ─► ChunkedStart ...
//! ```

mod builtin;
mod context;
mod registry;

pub use builtin::{
    BytesMarshaller, ChunkedBody, ChunkedBodyMarshaller, ContentTypeMarshaller, EntityMarshaller,
    JsonMarshaller, MsgPackMarshaller, StringMarshaller,
};
pub use context::MarshallingContext;
pub use registry::MarshallerRegistry;

use crate::context::RequestResult;

/// Converts values of type `T` into a response through a [`MarshallingContext`].
///
/// Implementations must end every call with one terminal operation on the
/// context (or by starting a chunked message they go on to finish).
pub trait Marshaller<T: ?Sized>: Send + Sync + 'static {
    fn marshal(&self, value: &T, ctx: MarshallingContext) -> RequestResult;
}

impl<T, F> Marshaller<T> for F
where
    T: ?Sized,
    F: Fn(&T, MarshallingContext) -> RequestResult + Send + Sync + 'static,
{
    fn marshal(&self, value: &T, ctx: MarshallingContext) -> RequestResult {
        self(value, ctx)
    }
}
