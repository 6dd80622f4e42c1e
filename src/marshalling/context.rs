//! The capability handed to marshallers.

use http::{HeaderMap, StatusCode};

use crate::context::{RequestContext, RequestResult};
use crate::error::BoxError;
use crate::model::{ContentType, HttpEntity, HttpRequest, HttpResponse};
use crate::rejection::Rejection;
use crate::responder::{ResponderRef, RouteMessage};

/// Terminal operations available to a marshaller, bound to the status and
/// headers of the `complete*` call that created it.
pub struct MarshallingContext {
    ctx: RequestContext,
    status: StatusCode,
    headers: HeaderMap,
}

impl MarshallingContext {
    pub(crate) fn new(ctx: RequestContext, status: StatusCode, headers: HeaderMap) -> Self {
        Self {
            ctx,
            status,
            headers,
        }
    }

    /// Get the status the response will carry.
    #[inline]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Get the headers the response will carry.
    #[inline]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Mutable access to the response headers, e.g. to announce a content type
    /// before a chunked body.
    #[inline]
    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// Get the request being answered.
    #[inline]
    pub fn request(&self) -> &HttpRequest {
        self.ctx.request()
    }

    /// Whether the request's negotiation headers accept `content_type`.
    pub fn try_accept(&self, content_type: &ContentType) -> bool {
        self.ctx.request().accepts_content_type(content_type)
    }

    /// Reject with the content types that would have been acceptable.
    pub fn reject_marshalling<I>(self, only_to: I) -> RequestResult
    where
        I: IntoIterator<Item = ContentType>,
    {
        self.ctx.reject([Rejection::UnacceptedResponseContentType {
            supported: only_to.into_iter().collect(),
        }])
    }

    /// Complete with `entity` under the bound status and headers.
    pub fn marshal_to(self, entity: HttpEntity) -> RequestResult {
        let response = self.response(entity);
        self.ctx.complete_response(response)
    }

    /// Fail the request with a marshalling error.
    pub fn handle_error(self, error: impl Into<BoxError>) -> RequestResult {
        self.ctx.fail_with(error)
    }

    /// Send a `ChunkedStart` carrying `entity` and return the responder the
    /// remaining `Chunk`s and the final `ChunkedEnd` must go to.
    pub fn start_chunked_message(self, entity: HttpEntity) -> ResponderRef {
        let response = self.response(entity);
        let responder = self.ctx.responder().clone();
        let _ = self.ctx.tell(RouteMessage::ChunkedStart(response));
        responder
    }

    fn response(&self, entity: HttpEntity) -> HttpResponse {
        HttpResponse {
            status: self.status,
            headers: self.headers.clone(),
            entity,
        }
    }
}
