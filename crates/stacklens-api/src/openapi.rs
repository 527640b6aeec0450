//! `OpenAPI` documentation generation and Swagger UI setup

use axum::{Json, Router, response::IntoResponse, routing::get};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// `OpenAPI` documentation for the Stacklens API
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::search::search_handler,
    ),
    components(
        schemas(
            // Search schemas
            crate::routes::search::SearchResponse,
            crate::routes::search::WebsiteResult,
            crate::routes::search::TechnologyResult,
            crate::routes::search::SuggestionResult,
            crate::routes::search::Pagination,
            stacklens_store::WebsiteMetadata,

            // Status schemas
            crate::routes::status::StatusResponse,
            crate::routes::status::ServerInfo,
            crate::routes::status::ServiceHealth,
            crate::routes::status::DatasetInfo,
        )
    ),
    tags(
        (name = "search", description = "Website technology search operations"),
    ),
    info(
        title = "Stacklens API",
        version = "0.2.0",
        description = "Discover which technologies websites use, by domain or by technology name",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "http://localhost:3000", description = "Local development server"),
    )
)]
pub struct ApiDoc;

/// Returns configured Swagger UI service
pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi())
}

/// Returns `OpenAPI` JSON as a response
pub async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}

/// Plain JSON route for the `OpenAPI` document
pub fn routes() -> Router {
    Router::new().route("/openapi.json", get(openapi_json))
}
