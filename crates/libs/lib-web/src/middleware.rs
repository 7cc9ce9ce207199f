//! # Middleware
//!
//! Request stamping: every request gets a unique id, available to handlers
//! via extensions and echoed back in the `X-Request-ID` header, plus one
//! latency log line per request.

use axum::extract::Request;
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::Response;
use std::time::Instant;
use tracing::info;
use uuid::Uuid;

/// Request id attached to every request.
#[derive(Clone, Debug)]
pub struct RequestStamp {
    pub id: String,
}

/// Stamp the request with an id and log method, path, status and latency.
pub async fn stamp_request(mut req: Request, next: Next) -> Response {
    let stamp = RequestStamp { id: Uuid::new_v4().to_string() };
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    req.extensions_mut().insert(stamp.clone());

    let started = Instant::now();
    let mut res = next.run(req).await;

    info!(
        "{} {} -> {} ({} ms) [{}]",
        method,
        path,
        res.status(),
        started.elapsed().as_millis(),
        stamp.id
    );

    if let Ok(value) = HeaderValue::from_str(&stamp.id) {
        res.headers_mut().insert("x-request-id", value);
    }
    res
}
