//! Application state for Axum handlers
//!
//! Contains the shared services (search resolution, store repository) that
//! are initialized once at startup and passed to all handlers.

use std::sync::Arc;

use stacklens_search::SearchProvider;
use stacklens_store::WebsiteRepository;

/// Application state containing all shared services
///
/// Initialized once at application startup and handed to handlers via Axum
/// state, so no connection pools or services are created per request.
#[derive(Clone)]
pub struct AppState {
    /// Search resolution engine
    pub search_service: Arc<dyn SearchProvider>,
    /// Store repository, used directly by the status endpoint
    pub repository: Arc<dyn WebsiteRepository>,
}

impl AppState {
    /// Create new application state with all services
    #[must_use]
    pub fn new(
        search_service: Arc<dyn SearchProvider>,
        repository: Arc<dyn WebsiteRepository>,
    ) -> Self {
        Self {
            search_service,
            repository,
        }
    }
}
