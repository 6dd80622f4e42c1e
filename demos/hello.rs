//! Hello routes - dispatching a handful of requests through a sealed route.
//!
//! This demo shows:
//! - Building routes with `path_prefix`, `method` and `or`
//! - Completing with registered marshallers, redirecting and streaming
//! - Reading the outcome through `Dispatcher::dispatch`
//!
//! ```text
//! RUST_LOG=routewire=debug cargo run --example hello
//! ```

use http::header::{HeaderValue, ACCEPT};
use http::{Method, Uri};
use routewire::marshalling::{ChunkedBody, JsonMarshaller};
use routewire::model::{ContentType, HttpRequest};
use routewire::route::{method, path_end, path_prefix, route, Route, RouteExt};
use routewire::{Dispatcher, RedirectionType};
use serde::Serialize;

#[derive(Serialize, Debug)]
struct Greeting {
    message: String,
    shout: bool,
}

fn routes() -> Route {
    let hello = path_prefix(
        "hello",
        path_end(method(
            Method::GET,
            route(|ctx| {
                let shout = ctx.request().uri.query() == Some("shout");
                let message = if shout { "HELLO" } else { "hello" };
                ctx.complete(Greeting {
                    message: message.to_string(),
                    shout,
                })
            }),
        )),
    );

    let old = path_prefix(
        "hi",
        route(|ctx| ctx.redirect("/hello", RedirectionType::MovedPermanently)),
    );

    let count = path_prefix(
        "count",
        route(|ctx| {
            let chunks = (1..=5).map(|n| format!("{n}\n"));
            ctx.complete(ChunkedBody::new(ContentType::TEXT_PLAIN_UTF8, chunks))
        }),
    );

    let broken = path_prefix("broken", route(|ctx| ctx.fail_with("backend unavailable")));

    hello.or(old).or(count).or(broken)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,routewire=debug")),
        )
        .init();

    let dispatcher = Dispatcher::builder()
        .marshaller::<Greeting, _>(JsonMarshaller)
        .route(routes())
        .max_concurrent_requests(16)
        .build()?;

    let requests = vec![
        HttpRequest::get(Uri::from_static("/hello")),
        HttpRequest::get(Uri::from_static("/hello?shout")),
        HttpRequest::get(Uri::from_static("/hello"))
            .with_header(ACCEPT, HeaderValue::from_static("text/html")),
        HttpRequest::new(Method::DELETE, Uri::from_static("/hello")),
        HttpRequest::get(Uri::from_static("/hi")),
        HttpRequest::get(Uri::from_static("/count")),
        HttpRequest::get(Uri::from_static("/broken")),
        HttpRequest::get(Uri::from_static("/missing")),
    ];

    for request in requests {
        let line = format!("{} {}", request.method, request.uri);
        let response = dispatcher.dispatch(request)?.into_response().await?;
        println!("{line} -> {}", response.status);
        for (name, value) in &response.headers {
            println!("    {}: {}", name, value.to_str().unwrap_or("<binary>"));
        }
        if !response.entity.is_empty() {
            println!("    {}", response.entity.as_string().replace('\n', "\n    "));
        }
    }

    Ok(())
}
