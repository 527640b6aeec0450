//! Correlation ID middleware
//!
//! Reads `X-Correlation-ID` from the incoming request (or generates one),
//! makes it available to handlers as a request extension, and echoes it on
//! the response so clients and logs can be matched up.

use axum::{
    extract::Request,
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use stacklens_common::CorrelationId;

const CORRELATION_HEADER: &str = "X-Correlation-ID";

/// Per-request context injected by [`correlation_id_middleware`]
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub correlation_id: CorrelationId,
}

/// Attach a correlation id to every request and response
pub async fn correlation_id_middleware(mut request: Request, next: Next) -> Response {
    let correlation_id = request
        .headers()
        .get(CORRELATION_HEADER)
        .and_then(|value| value.to_str().ok())
        .map_or_else(CorrelationId::new, CorrelationId::from);

    request.extensions_mut().insert(RequestContext {
        correlation_id: correlation_id.clone(),
    });

    let mut response = next.run(request).await;

    if let Ok(value) = HeaderValue::from_str(&correlation_id.to_string()) {
        response.headers_mut().insert(CORRELATION_HEADER, value);
    }

    response
}
