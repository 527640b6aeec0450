pub mod health;
pub mod search;
pub mod status;

use axum::{Router, middleware};

use crate::state::AppState;

/// Assemble the full application router
pub fn create_router(state: AppState, enable_docs: bool) -> Router {
    let mut router = Router::new()
        .merge(health::routes())
        .merge(search::routes(state.clone()))
        .merge(status::routes(state));

    if enable_docs {
        router = router
            .merge(crate::openapi::routes()) // OpenAPI JSON endpoint
            .merge(crate::openapi::swagger_ui()); // Swagger UI
    }

    // Add correlation ID middleware to all routes
    router.layer(middleware::from_fn(
        crate::middleware::correlation_id_middleware,
    ))
}
