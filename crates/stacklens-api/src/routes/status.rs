use axum::{Json, Router, extract::State, routing::get};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use std::time::SystemTime;
use utoipa::ToSchema;

use crate::state::AppState;
use stacklens_store::DatasetStats;

/// Server start time (initialized once on first access)
static SERVER_START_TIME: LazyLock<SystemTime> = LazyLock::new(SystemTime::now);

/// Server status information
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StatusResponse {
    pub server: ServerInfo,
    pub services: ServiceHealth,
    pub dataset: DatasetInfo,
}

/// Server information
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ServerInfo {
    /// API version
    pub version: String,
    /// Server uptime in seconds
    pub uptime_seconds: u64,
}

/// Service health status
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ServiceHealth {
    /// `PostgreSQL` connection status ("connected", "disconnected")
    pub postgres: String,
}

/// Crowd-sourced dataset statistics
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DatasetInfo {
    /// Total scraped websites
    pub websites: i64,
    /// Distinct technologies in the catalog
    pub technologies: i64,
    /// Website-technology links
    pub links: i64,
    /// Most recent scrape timestamp (ISO 8601 format)
    pub last_scraped_at: Option<String>,
}

/// Axum handler for GET /api/status
///
/// One store round-trip doubles as the connectivity check and the dataset
/// statistics source; a failure degrades to "disconnected" with zeroed
/// counts instead of an error response.
pub async fn status_handler(State(state): State<AppState>) -> Json<StatusResponse> {
    let (postgres, stats) = match state.repository.dataset_stats().await {
        Ok(stats) => ("connected".to_string(), stats),
        Err(_) => (
            "disconnected".to_string(),
            DatasetStats {
                websites: 0,
                technologies: 0,
                links: 0,
                last_scraped: None,
            },
        ),
    };

    let uptime = SERVER_START_TIME
        .elapsed()
        .map(|d| d.as_secs())
        .unwrap_or(0);

    Json(StatusResponse {
        server: ServerInfo {
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds: uptime,
        },
        services: ServiceHealth { postgres },
        dataset: DatasetInfo {
            websites: stats.websites,
            technologies: stats.technologies,
            links: stats.links,
            last_scraped_at: stats.last_scraped.map(|dt| dt.to_rfc3339()),
        },
    })
}

/// Create status routes with application state
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/api/status", get(status_handler))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)] // OK in tests

    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use stacklens_config::SearchConfig;
    use stacklens_search::SearchService;
    use stacklens_store::MockWebsiteRepository;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn state_with(mock: MockWebsiteRepository) -> AppState {
        let repository: Arc<dyn stacklens_store::WebsiteRepository> = Arc::new(mock);
        let search_service = Arc::new(SearchService::new(
            Arc::clone(&repository),
            SearchConfig {
                default_page_size: 20,
                max_page_size: 100,
                suggestion_limit: 5,
            },
        ));
        AppState::new(search_service, repository)
    }

    #[tokio::test]
    async fn status_degrades_to_disconnected_on_store_failure() {
        let mock = MockWebsiteRepository::new();
        mock.fail_next("no route to host");
        let router = routes(state_with(mock));

        let response = router
            .oneshot(
                Request::builder()
                    .uri("/api/status")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["services"]["postgres"], "disconnected");
        assert_eq!(json["dataset"]["websites"], 0);
    }
}
