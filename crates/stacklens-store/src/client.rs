//! Store client combining pool manager and repository

use anyhow::Result;
use std::sync::Arc;

use crate::pool_manager::{PoolConfig, PoolManager};
use crate::repository::PgWebsiteRepository;
use stacklens_config::DatabaseConfig;

/// Store client combining pool manager and repository
pub struct StoreClient {
    pools: PoolManager,
    repository: Arc<PgWebsiteRepository>,
}

impl StoreClient {
    /// Create new store client from pool manager
    pub fn new(pools: PoolManager) -> Self {
        let repository = Arc::new(PgWebsiteRepository::new(pools.clone()));
        Self { pools, repository }
    }

    /// Initialize with config using the default pool sizing
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Database connection fails
    /// - Pool creation fails due to invalid configuration
    pub async fn initialize(config: &DatabaseConfig) -> Result<Self> {
        let pool_config = PoolConfig::default();
        let pools = PoolManager::new(config, pool_config).await?;
        Ok(Self::new(pools))
    }

    /// Get a shared handle to the repository
    pub fn repository(&self) -> Arc<PgWebsiteRepository> {
        Arc::clone(&self.repository)
    }

    /// Get pool manager
    pub const fn pools(&self) -> &PoolManager {
        &self.pools
    }
}
