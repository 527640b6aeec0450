use axum::{Extension, Json, Router, routing::get};
use serde_json::json;
use stacklens_common::CorrelationId;
use tracing::{info, instrument};

use crate::middleware::RequestContext;

pub fn routes() -> Router {
    Router::new().route("/health", get(health_check))
}

/// Liveness probe with correlation ID tracking
#[instrument(fields(correlation_id))]
async fn health_check(context: Option<Extension<RequestContext>>) -> Json<serde_json::Value> {
    let correlation_id = context
        .as_ref()
        .map_or_else(CorrelationId::new, |ctx| ctx.correlation_id.clone());

    tracing::Span::current().record("correlation_id", correlation_id.to_string());

    info!(
        correlation_id = %correlation_id,
        "Health check request"
    );

    Json(json!({
        "status": "healthy",
        "service": "stacklens-api",
        "correlation_id": correlation_id.to_string()
    }))
}
