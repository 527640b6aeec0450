//! Search API routes and handlers for the Stacklens service.
//!
//! This module provides the HTTP endpoint for the hybrid search: a single
//! free-text query is resolved as a website domain, a technology name, or
//! both, against the crowd-sourced store.
//!
//! # API Overview
//!
//! - `GET /api/search` - resolve a query with optional facet filters,
//!   sorting, and pagination
//!
//! # Example Usage
//!
//! ```text
//! GET /api/search?q=shopify.com&https=true&page=1&limit=20
//! ```
//!
//! Response:
//! ```json
//! {
//!   "results": [
//!     {
//!       "id": "0b0f7f3e-…",
//!       "url": "shopify.com",
//!       "technologies": [{"name": "Shopify", "category": "Ecommerce"}],
//!       "lastScraped": "2026-05-01T12:00:00Z",
//!       "metadata": {"is_https": true}
//!     }
//!   ],
//!   "suggestions": [],
//!   "pagination": {"page": 1, "limit": 20, "total": 1, "totalPages": 1}
//! }
//! ```
//!
//! # Parameter leniency
//!
//! Malformed values (`page=abc`, `sort=sideways`, `https=maybe`) never
//! produce a 4xx: they silently coerce to the documented defaults, matching
//! the "no input shape is an error" contract of the resolution engine.

use axum::{
    Json, Router,
    extract::{Extension, Query, State},
    routing::get,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{error, info, instrument, warn};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::middleware::RequestContext;
use crate::state::AppState;
use crate::{ApiError, ApiResult};
use stacklens_common::CorrelationId;
use stacklens_search::{SearchOutcome, SearchRequest};
use stacklens_store::{MetadataFilters, Sort, WebsiteMetadata};

/// Hard ceiling on one search resolution, engine time included
const SEARCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Raw query-string parameters for `GET /api/search`.
///
/// Everything is optional and everything is a string: numeric and boolean
/// parameters are parsed leniently so that malformed input degrades to the
/// defaults instead of rejecting the request.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchParams {
    /// Free-text query: website domain or technology name
    pub q: Option<String>,
    /// Explicit technology name filter (exact-preferred count, substring rows)
    pub tech: Option<String>,
    /// Exact category filter; wins over `q` and `tech`
    pub category: Option<String>,
    /// Sort field: `url` | `last_scraped` (default) | `load_time`
    pub sort: Option<String>,
    /// Sort direction: `asc` | `desc` (default)
    pub order: Option<String>,
    /// 1-based page number, default 1
    pub page: Option<String>,
    /// Page size, default 20, capped at 100
    pub limit: Option<String>,
    /// Facet filter: `"true"` / `"false"` on `is_responsive`
    pub responsive: Option<String>,
    /// Facet filter: `"true"` / `"false"` on `is_https`
    pub https: Option<String>,
    /// Facet filter: `"true"` / `"false"` on `likely_spa`
    pub spa: Option<String>,
    /// Facet filter: `"true"` / `"false"` on `has_service_worker`
    pub service_worker: Option<String>,
}

impl SearchParams {
    /// Coerce the raw parameters into an engine request.
    ///
    /// Unknown sort/order values, non-numeric page/limit, and facet values
    /// other than the literal `true`/`false` all fall back to defaults.
    fn into_request(self) -> SearchRequest {
        SearchRequest {
            query: self.q,
            tech: self.tech,
            category: self.category,
            sort: Sort::from_params(self.sort.as_deref(), self.order.as_deref()),
            page: parse_number(self.page.as_deref()).unwrap_or(1),
            limit: parse_number(self.limit.as_deref()),
            filters: MetadataFilters {
                https: parse_flag(self.https.as_deref()),
                responsive: parse_flag(self.responsive.as_deref()),
                spa: parse_flag(self.spa.as_deref()),
                service_worker: parse_flag(self.service_worker.as_deref()),
            },
        }
    }
}

fn parse_flag(value: Option<&str>) -> Option<bool> {
    match value.map(str::trim) {
        Some("true") => Some(true),
        Some("false") => Some(false),
        _ => None,
    }
}

fn parse_number(value: Option<&str>) -> Option<i64> {
    value.and_then(|v| v.trim().parse().ok())
}

/// The complete search envelope
#[derive(Debug, Serialize, ToSchema)]
pub struct SearchResponse {
    /// Deduplicated candidates for the current page
    pub results: Vec<WebsiteResult>,
    /// "Did you mean" fallbacks, populated only when `results` is empty
    pub suggestions: Vec<SuggestionResult>,
    /// Pagination block
    pub pagination: Pagination,
}

/// One website in the result list
#[derive(Debug, Serialize, ToSchema)]
pub struct WebsiteResult {
    /// Website identity (dedup key)
    #[schema(value_type = String)]
    pub id: Uuid,
    /// Normalized domain
    pub url: String,
    /// Technologies detected on this website
    pub technologies: Vec<TechnologyResult>,
    /// When the site was last scraped
    #[serde(rename = "lastScraped")]
    #[schema(value_type = String)]
    pub last_scraped: DateTime<Utc>,
    /// Page metadata facets captured at scrape time
    pub metadata: WebsiteMetadata,
}

/// One detected technology on a website
#[derive(Debug, Serialize, ToSchema)]
pub struct TechnologyResult {
    pub name: String,
    pub category: String,
}

/// A "did you mean" suggestion
#[derive(Debug, Serialize, ToSchema)]
pub struct SuggestionResult {
    /// Always `"technology"` - suggestions come from the technology table
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    pub category: String,
    /// Human-readable hint
    pub suggestion: String,
}

/// Pagination block
#[derive(Debug, Serialize, ToSchema)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    /// Strategy count; for combined searches this is the documented
    /// `max(domain, technology)` approximation
    pub total: i64,
    #[serde(rename = "totalPages")]
    pub total_pages: i64,
}

impl SearchResponse {
    fn from_outcome(outcome: SearchOutcome) -> Self {
        let results = outcome
            .candidates
            .into_iter()
            .map(|candidate| {
                let website = candidate.website;
                WebsiteResult {
                    id: website.id,
                    url: website.domain,
                    technologies: website
                        .technologies
                        .into_iter()
                        .map(|t| TechnologyResult {
                            name: t.name,
                            category: t.category,
                        })
                        .collect(),
                    last_scraped: website.last_scraped,
                    metadata: website.metadata,
                }
            })
            .collect();

        let suggestions = outcome
            .suggestions
            .into_iter()
            .map(|s| SuggestionResult {
                kind: "technology".to_string(),
                name: s.name,
                category: s.category,
                suggestion: s.hint,
            })
            .collect();

        Self {
            results,
            suggestions,
            pagination: Pagination {
                page: outcome.page_info.page,
                limit: outcome.page_info.limit,
                total: outcome.page_info.total,
                total_pages: outcome.page_info.total_pages,
            },
        }
    }
}

/// Create search routes with the shared application state
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/api/search", get(search_handler))
        .with_state(state)
}

/// Resolve a search query against the website/technology store.
///
/// Classifies the query (domain-like, technology-like, or both), fans the
/// matching retrieval strategies out concurrently, merges and deduplicates
/// their candidates, and falls back to technology-name suggestions when
/// nothing matched.
#[utoipa::path(
    get,
    path = "/api/search",
    tag = "search",
    params(SearchParams),
    responses(
        (status = 200, description = "Search envelope", body = SearchResponse),
        (status = 500, description = "A store query behind the search failed"),
        (status = 503, description = "Store unreachable or request timed out")
    )
)]
#[instrument(skip(state, params), fields(correlation_id))]
pub async fn search_handler(
    State(state): State<AppState>,
    context: Option<Extension<RequestContext>>,
    Query(params): Query<SearchParams>,
) -> ApiResult<Json<SearchResponse>> {
    let start = std::time::Instant::now();
    // Use correlation ID from middleware if available, otherwise generate one
    let correlation_id = context
        .as_ref()
        .map_or_else(CorrelationId::new, |ctx| ctx.correlation_id.clone());

    tracing::Span::current().record("correlation_id", correlation_id.to_string());

    info!(
        correlation_id = %correlation_id,
        q = ?params.q,
        tech = ?params.tech,
        category = ?params.category,
        "Processing search request"
    );

    let request = params.into_request();

    let outcome = match tokio::time::timeout(
        SEARCH_TIMEOUT,
        state.search_service.search(&request, &correlation_id),
    )
    .await
    {
        Ok(Ok(outcome)) => outcome,
        Ok(Err(search_error)) => {
            error!(
                correlation_id = %correlation_id,
                error = %search_error,
                "Search engine returned error"
            );
            return Err(ApiError::from_search_error(&search_error, correlation_id));
        }
        Err(_elapsed) => {
            warn!(
                correlation_id = %correlation_id,
                timeout_ms = SEARCH_TIMEOUT.as_millis() as u64,
                "Search request timed out"
            );
            return Err(ApiError::ServiceUnavailable {
                retry_after_seconds: 30,
                correlation_id,
            });
        }
    };

    let response = SearchResponse::from_outcome(outcome);

    info!(
        correlation_id = %correlation_id,
        result_count = response.results.len(),
        suggestion_count = response.suggestions.len(),
        total = response.pagination.total,
        query_time_ms = start.elapsed().as_millis() as u64,
        "Search request completed"
    );

    Ok(Json(response))
}
