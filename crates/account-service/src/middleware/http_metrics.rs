//! Request metrics middleware.
//!
//! Sits outermost so every response is counted, including the ones the
//! framework produces before a handler runs (404 route misses, 405
//! wrong method, 413 over the multipart body limit, 415 content-type
//! mismatches).

use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;

use crate::observability::metrics::record_http_request;

/// Record method, normalized path, status code, and duration for every
/// response that leaves the service.
pub async fn http_metrics_middleware(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let path = request.uri().path().to_string();

    let response = next.run(request).await;

    record_http_request(
        &method,
        &path,
        response.status().as_u16(),
        start.elapsed(),
    );

    response
}
