//! Application bootstrap and service initialization
//!
//! This module handles all service setup and dependency injection for the
//! API server. It separates configuration and initialization logic from the
//! main entry point.

use std::sync::Arc;
use tracing::info;

use crate::AppState;
use stacklens_config::ApplicationConfig;
use stacklens_search::{SearchProvider, SearchService};
use stacklens_store::{StoreClient, WebsiteRepository};

/// Bootstrap result type
pub type BootstrapResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Initialize the store client and its connection pools
///
/// # Errors
///
/// Returns error if database connection fails
pub async fn setup_store(config: &ApplicationConfig) -> BootstrapResult<StoreClient> {
    info!("Initializing store connection pools...");
    let store = StoreClient::initialize(&config.database).await?;
    info!(pools = ?store.pools().stats(), "Store pools ready");
    Ok(store)
}

/// Initialize the search service over the store repository
pub fn setup_search_service(
    config: &ApplicationConfig,
    repository: Arc<dyn WebsiteRepository>,
) -> Arc<dyn SearchProvider> {
    info!("Initializing search service...");
    Arc::new(SearchService::new(repository, config.search.clone())) as Arc<dyn SearchProvider>
}

/// Initialize all services and create application state
///
/// # Errors
///
/// Returns error if any service initialization fails
pub async fn initialize_app_state(config: &ApplicationConfig) -> BootstrapResult<AppState> {
    // 1. Store (the only shared resource)
    let store = setup_store(config).await?;
    let repository: Arc<dyn WebsiteRepository> = store.repository();

    // 2. Search service over the repository
    let search_service = setup_search_service(config, Arc::clone(&repository));

    let state = AppState::new(search_service, repository);

    info!("Application state initialized successfully");
    Ok(state)
}
