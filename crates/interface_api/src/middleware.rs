//! API middleware

use axum::{body::Body, http::Request, middleware::Next, response::Response};
use std::time::Instant;
use tracing::info;

/// Header carrying the request correlation id
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Request logging middleware
///
/// Logs one line per request with the correlation id set by the request-id
/// layer.
pub async fn request_log_middleware(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("-")
        .to_string();

    let start = Instant::now();
    let response = next.run(request).await;

    info!(
        method = %method,
        uri = %uri,
        request_id = %request_id,
        status = response.status().as_u16(),
        duration_ms = start.elapsed().as_millis() as u64,
        "API request"
    );

    response
}
