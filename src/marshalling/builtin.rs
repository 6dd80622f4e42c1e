//! Built-in marshallers.

use std::marker::PhantomData;

use bytes::Bytes;
use http::header::{HeaderValue, CONTENT_TYPE};
use serde::Serialize;

use super::{Marshaller, MarshallingContext};
use crate::codec::{JsonCodec, MsgPackCodec};
use crate::context::RequestResult;
use crate::error::{Result, RouteError};
use crate::model::{ContentType, HttpEntity};
use crate::responder::{Responder, RouteMessage};

/// Marshal already-encoded data as a single content type, rejecting when the
/// client does not accept it.
fn marshal_single(
    ctx: MarshallingContext,
    content_type: ContentType,
    encoded: Result<Bytes>,
) -> RequestResult {
    if !ctx.try_accept(&content_type) {
        return ctx.reject_marshalling([content_type]);
    }
    match encoded {
        Ok(data) => ctx.marshal_to(HttpEntity::new(content_type, data)),
        Err(e) => ctx.handle_error(e),
    }
}

/// `text/plain; charset=utf-8` for anything string-like.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringMarshaller;

impl<T> Marshaller<T> for StringMarshaller
where
    T: AsRef<str> + ?Sized,
{
    fn marshal(&self, value: &T, ctx: MarshallingContext) -> RequestResult {
        let data = Bytes::copy_from_slice(value.as_ref().as_bytes());
        marshal_single(ctx, ContentType::TEXT_PLAIN_UTF8, Ok(data))
    }
}

/// `application/octet-stream` for raw bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct BytesMarshaller;

impl<T> Marshaller<T> for BytesMarshaller
where
    T: AsRef<[u8]> + ?Sized,
{
    fn marshal(&self, value: &T, ctx: MarshallingContext) -> RequestResult {
        let data = Bytes::copy_from_slice(value.as_ref());
        marshal_single(ctx, ContentType::APPLICATION_OCTET_STREAM, Ok(data))
    }
}

/// `application/json` via serde_json.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonMarshaller;

impl<T> Marshaller<T> for JsonMarshaller
where
    T: Serialize + ?Sized,
{
    fn marshal(&self, value: &T, ctx: MarshallingContext) -> RequestResult {
        let encoded = JsonCodec::encode(value).map(Bytes::from);
        marshal_single(ctx, ContentType::APPLICATION_JSON, encoded)
    }
}

/// `application/msgpack` via rmp-serde, structs encoded as maps.
#[derive(Debug, Clone, Copy, Default)]
pub struct MsgPackMarshaller;

impl<T> Marshaller<T> for MsgPackMarshaller
where
    T: Serialize + ?Sized,
{
    fn marshal(&self, value: &T, ctx: MarshallingContext) -> RequestResult {
        let encoded = MsgPackCodec::encode(value).map(Bytes::from);
        marshal_single(ctx, ContentType::APPLICATION_MSGPACK, encoded)
    }
}

/// Pass-through for entities that already carry their content type.
#[derive(Debug, Clone, Copy, Default)]
pub struct EntityMarshaller;

impl Marshaller<HttpEntity> for EntityMarshaller {
    fn marshal(&self, value: &HttpEntity, ctx: MarshallingContext) -> RequestResult {
        match value.content_type() {
            Some(content_type) if !ctx.try_accept(content_type) => {
                let content_type = content_type.clone();
                ctx.reject_marshalling([content_type])
            }
            _ => ctx.marshal_to(value.clone()),
        }
    }
}

/// A body sent as a chunked response: the first chunk travels with
/// `ChunkedStart`, the rest as `Chunk` messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkedBody {
    pub content_type: ContentType,
    pub chunks: Vec<Bytes>,
}

impl ChunkedBody {
    /// Body of the given content type, streamed as `chunks` in order.
    pub fn new<I, B>(content_type: ContentType, chunks: I) -> Self
    where
        I: IntoIterator<Item = B>,
        B: Into<Bytes>,
    {
        Self {
            content_type,
            chunks: chunks.into_iter().map(Into::into).collect(),
        }
    }
}

/// Streams a [`ChunkedBody`] as `ChunkedStart`, `Chunk`s and `ChunkedEnd`.
///
/// When the first chunk is empty the start message has no entity to carry the
/// content type, so it is sent as a `Content-Type` header instead.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChunkedBodyMarshaller;

impl Marshaller<ChunkedBody> for ChunkedBodyMarshaller {
    fn marshal(&self, value: &ChunkedBody, mut ctx: MarshallingContext) -> RequestResult {
        if !ctx.try_accept(&value.content_type) {
            return ctx.reject_marshalling([value.content_type.clone()]);
        }

        let mut chunks = value.chunks.iter().cloned();
        let first = chunks.next().unwrap_or_default();
        if first.is_empty() {
            match HeaderValue::from_str(&value.content_type.to_string()) {
                Ok(header) => {
                    ctx.headers_mut().insert(CONTENT_TYPE, header);
                }
                Err(e) => return ctx.handle_error(RouteError::from(e)),
            }
        }

        let entity = HttpEntity::new(value.content_type.clone(), first);
        let responder = ctx.start_chunked_message(entity);

        for chunk in chunks {
            responder.tell(RouteMessage::chunk(chunk), None);
        }
        responder.tell(RouteMessage::chunked_end(), None);
        RequestResult::HANDLED
    }
}

type EncodeFn<T> = dyn Fn(&T, &ContentType) -> Result<Bytes> + Send + Sync;

/// Marshaller offering several content types: the first one the client
/// accepts wins.
///
/// # Example
///
/// ```
/// use bytes::Bytes;
/// use routewire::marshalling::{ContentTypeMarshaller, MarshallerRegistry};
/// use routewire::model::ContentType;
///
/// struct Temperature(f64);
///
/// let marshaller = ContentTypeMarshaller::of(
///     vec![ContentType::TEXT_PLAIN_UTF8, ContentType::APPLICATION_JSON],
///     |t: &Temperature, content_type: &ContentType| {
///         let body = if content_type == &ContentType::APPLICATION_JSON {
///             format!("{{\"celsius\":{}}}", t.0)
///         } else {
///             format!("{} C", t.0)
///         };
///         Ok(Bytes::from(body))
///     },
/// );
///
/// let mut registry = MarshallerRegistry::with_defaults();
/// registry.register::<Temperature, _>(marshaller);
/// assert!(registry.contains::<Temperature>());
/// ```
pub struct ContentTypeMarshaller<T: ?Sized> {
    content_types: Vec<ContentType>,
    encode: Box<EncodeFn<T>>,
    _marker: PhantomData<fn(&T)>,
}

impl<T: ?Sized> ContentTypeMarshaller<T> {
    /// Offer `content_types` in order of preference, encoding with `encode`.
    pub fn of<F>(content_types: Vec<ContentType>, encode: F) -> Self
    where
        F: Fn(&T, &ContentType) -> Result<Bytes> + Send + Sync + 'static,
    {
        Self {
            content_types,
            encode: Box::new(encode),
            _marker: PhantomData,
        }
    }

    /// Offered content types, most preferred first.
    pub fn content_types(&self) -> &[ContentType] {
        &self.content_types
    }
}

impl<T: ?Sized + 'static> Marshaller<T> for ContentTypeMarshaller<T> {
    fn marshal(&self, value: &T, ctx: MarshallingContext) -> RequestResult {
        let Some(content_type) = self.content_types.iter().find(|ct| ctx.try_accept(ct)) else {
            return ctx.reject_marshalling(self.content_types.iter().cloned());
        };
        match (self.encode)(value, content_type) {
            Ok(data) => ctx.marshal_to(HttpEntity::new(content_type.clone(), data)),
            Err(e) => ctx.handle_error(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::RequestContext;
    use crate::model::HttpRequest;
    use crate::rejection::Rejection;
    use crate::responder::{ChannelResponder, Envelope};
    use http::header::ACCEPT;
    use http::{HeaderMap, StatusCode, Uri};
    use tokio::sync::mpsc::UnboundedReceiver;

    fn mctx(accept: Option<&'static str>) -> (MarshallingContext, UnboundedReceiver<Envelope>) {
        let (responder, rx) = ChannelResponder::channel();
        let mut request = HttpRequest::get(Uri::from_static("/"));
        if let Some(accept) = accept {
            request = request.with_header(ACCEPT, HeaderValue::from_static(accept));
        }
        let ctx = RequestContext::new(request, responder)
            .marshalling_context(StatusCode::OK, HeaderMap::new());
        (ctx, rx)
    }

    fn messages(rx: &mut UnboundedReceiver<Envelope>) -> Vec<RouteMessage> {
        let mut out = Vec::new();
        while let Ok(envelope) = rx.try_recv() {
            out.push(envelope.message);
        }
        out
    }

    fn entity_of(message: &RouteMessage) -> &HttpEntity {
        match message {
            RouteMessage::Response(response) => &response.entity,
            other => panic!("expected response, got {other:?}"),
        }
    }

    #[derive(Serialize)]
    struct Point {
        x: i32,
        y: i32,
    }

    #[test]
    fn test_string_marshaller() {
        let (ctx, mut rx) = mctx(None);
        let _ = StringMarshaller.marshal("hello", ctx);

        let out = messages(&mut rx);
        assert_eq!(
            entity_of(&out[0]),
            &HttpEntity::new(ContentType::TEXT_PLAIN_UTF8, "hello")
        );
    }

    #[test]
    fn test_bytes_marshaller() {
        let (ctx, mut rx) = mctx(Some("application/*"));
        let _ = BytesMarshaller.marshal(&vec![1u8, 2, 3], ctx);

        let out = messages(&mut rx);
        assert_eq!(entity_of(&out[0]).data(), Bytes::from_static(&[1, 2, 3]));
    }

    #[test]
    fn test_json_marshaller() {
        let (ctx, mut rx) = mctx(Some("application/json"));
        let _ = JsonMarshaller.marshal(&Point { x: 1, y: 2 }, ctx);

        let out = messages(&mut rx);
        let entity = entity_of(&out[0]);
        assert_eq!(entity.content_type(), Some(&ContentType::APPLICATION_JSON));
        assert_eq!(entity.as_string(), r#"{"x":1,"y":2}"#);
    }

    #[test]
    fn test_msgpack_marshaller_uses_map_encoding() {
        let (ctx, mut rx) = mctx(Some("application/msgpack"));
        let _ = MsgPackMarshaller.marshal(&Point { x: 1, y: 2 }, ctx);

        let out = messages(&mut rx);
        let entity = entity_of(&out[0]);
        assert_eq!(entity.content_type(), Some(&ContentType::APPLICATION_MSGPACK));
        assert_eq!(entity.data()[0], 0x82);
    }

    #[test]
    fn test_unacceptable_rejects_with_candidates() {
        let (ctx, mut rx) = mctx(Some("text/html"));
        let _ = JsonMarshaller.marshal(&Point { x: 0, y: 0 }, ctx);

        let out = messages(&mut rx);
        assert_eq!(out.len(), 1);
        match &out[0] {
            RouteMessage::Rejected(rejected) => assert_eq!(
                rejected.rejections(),
                &[Rejection::UnacceptedResponseContentType {
                    supported: vec![ContentType::APPLICATION_JSON]
                }]
            ),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_entity_marshaller_passes_through() {
        let (ctx, mut rx) = mctx(Some("text/html"));
        let entity = HttpEntity::html("<p>hi</p>");
        let _ = EntityMarshaller.marshal(&entity, ctx);

        assert_eq!(entity_of(&messages(&mut rx)[0]), &entity);
    }

    #[test]
    fn test_entity_marshaller_empty_always_accepted() {
        let (ctx, mut rx) = mctx(Some("application/json"));
        let _ = EntityMarshaller.marshal(&HttpEntity::Empty, ctx);

        assert!(entity_of(&messages(&mut rx)[0]).is_empty());
    }

    #[test]
    fn test_chunked_body_marshaller_streams_in_order() {
        let (ctx, mut rx) = mctx(None);
        let body = ChunkedBody::new(ContentType::TEXT_PLAIN_UTF8, ["a", "b", "c"]);
        let _ = ChunkedBodyMarshaller.marshal(&body, ctx);

        let out = messages(&mut rx);
        let kinds: Vec<_> = out.iter().map(RouteMessage::kind).collect();
        assert_eq!(kinds, vec!["chunked-start", "chunk", "chunk", "chunked-end"]);
        match (&out[0], &out[2]) {
            (RouteMessage::ChunkedStart(start), RouteMessage::Chunk(chunk)) => {
                assert_eq!(start.entity.as_string(), "a");
                assert_eq!(chunk.data, Bytes::from_static(b"c"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_chunked_body_with_empty_first_chunk_announces_content_type() {
        let (ctx, mut rx) = mctx(None);
        let body = ChunkedBody::new(ContentType::TEXT_PLAIN_UTF8, ["", "abc"]);
        let _ = ChunkedBodyMarshaller.marshal(&body, ctx);

        match messages(&mut rx).first() {
            Some(RouteMessage::ChunkedStart(start)) => {
                assert!(start.entity.is_empty());
                assert_eq!(start.headers[CONTENT_TYPE], "text/plain; charset=utf-8");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_content_type_marshaller_picks_first_acceptable() {
        let marshaller = ContentTypeMarshaller::of(
            vec![ContentType::TEXT_PLAIN_UTF8, ContentType::APPLICATION_JSON],
            |n: &i64, ct: &ContentType| {
                Ok(if ct == &ContentType::APPLICATION_JSON {
                    Bytes::from(format!("{{\"n\":{n}}}"))
                } else {
                    Bytes::from(n.to_string())
                })
            },
        );

        let (ctx, mut rx) = mctx(Some("application/json, text/plain;q=0"));
        let _ = marshaller.marshal(&7, ctx);
        assert_eq!(entity_of(&messages(&mut rx)[0]).as_string(), r#"{"n":7}"#);

        let (ctx, mut rx) = mctx(None);
        let _ = marshaller.marshal(&7, ctx);
        assert_eq!(entity_of(&messages(&mut rx)[0]).as_string(), "7");
    }

    #[test]
    fn test_encoding_error_becomes_failure() {
        let marshaller =
            ContentTypeMarshaller::of(vec![ContentType::APPLICATION_JSON], |_: &(), _| {
                Err(RouteError::Failed("cannot encode".into()))
            });

        let (ctx, mut rx) = mctx(None);
        let _ = marshaller.marshal(&(), ctx);

        match &messages(&mut rx)[0] {
            RouteMessage::Failure(failure) => {
                assert!(failure.to_string().contains("cannot encode"))
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
