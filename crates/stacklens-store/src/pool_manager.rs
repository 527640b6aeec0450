//! Connection pool management with per-workload separation
//!
//! Search queries fan out multi-join work that can starve the cheap lookups
//! (status counts, suggestion fetches) under load, so the two workloads get
//! their own pools.

use anyhow::{Context, Result};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use stacklens_config::DatabaseConfig;
use std::time::Duration;

/// Extension trait for saturating cast from usize to u32
trait SaturatingCast {
    fn saturating_cast(self) -> u32;
}

impl SaturatingCast for usize {
    fn saturating_cast(self) -> u32 {
        u32::try_from(self).unwrap_or(u32::MAX)
    }
}

/// Configuration for connection pools
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Maximum connections for the search pool
    pub search_pool_size: u32,
    /// Maximum connections for the lookup pool
    pub lookup_pool_size: u32,
    /// Connection timeout in seconds
    pub connect_timeout: u64,
    /// Idle timeout in seconds
    pub idle_timeout: u64,
    /// Maximum lifetime in seconds
    pub max_lifetime: u64,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            search_pool_size: 20,
            lookup_pool_size: 5,
            connect_timeout: 30,
            idle_timeout: 600,
            max_lifetime: 1800,
        }
    }
}

/// Manages the connection pools for the two store workloads
#[derive(Clone)]
pub struct PoolManager {
    /// Pool for the heavy search retrieval queries
    search_pool: PgPool,
    /// Pool for cheap lookups (counts, suggestions, health checks)
    lookup_pool: PgPool,
}

impl PoolManager {
    /// Create a new pool manager with the given configuration
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Database connection options are malformed
    /// - The database server is unreachable or refuses connections
    /// - Authentication fails
    /// - Either pool fails to connect within the configured timeout
    pub async fn new(db_config: &DatabaseConfig, config: PoolConfig) -> Result<Self> {
        let base_options = db_config.connect_options().application_name("stacklens");

        // Larger pool - search fans out concurrent strategy queries
        let search_pool = PgPoolOptions::new()
            .max_connections(config.search_pool_size)
            .acquire_timeout(Duration::from_secs(config.connect_timeout))
            .idle_timeout(Duration::from_secs(config.idle_timeout))
            .max_lifetime(Duration::from_secs(config.max_lifetime))
            .connect_with(base_options.clone())
            .await
            .context("Failed to create search pool")?;

        let lookup_pool = PgPoolOptions::new()
            .max_connections(config.lookup_pool_size)
            .acquire_timeout(Duration::from_secs(config.connect_timeout))
            .idle_timeout(Duration::from_secs(config.idle_timeout))
            .max_lifetime(Duration::from_secs(config.max_lifetime))
            .connect_with(base_options)
            .await
            .context("Failed to create lookup pool")?;

        Ok(Self {
            search_pool,
            lookup_pool,
        })
    }

    /// Get the pool for search retrieval queries
    pub const fn search_pool(&self) -> &PgPool {
        &self.search_pool
    }

    /// Get the pool for cheap lookup queries
    pub const fn lookup_pool(&self) -> &PgPool {
        &self.lookup_pool
    }

    /// Create with default pool sizing from environment-derived config
    ///
    /// # Errors
    ///
    /// Returns an error if pool creation fails (see [`Self::new`]).
    pub async fn from_env() -> Result<Self> {
        let db_config = DatabaseConfig::from_env();
        Self::new(&db_config, PoolConfig::default()).await
    }

    /// Get pool statistics
    pub fn stats(&self) -> PoolStats {
        PoolStats {
            search_pool: ConnectionStats {
                size: self.search_pool.size(),
                idle: self.search_pool.num_idle().saturating_cast(),
                max: self.search_pool.options().get_max_connections(),
            },
            lookup_pool: ConnectionStats {
                size: self.lookup_pool.size(),
                idle: self.lookup_pool.num_idle().saturating_cast(),
                max: self.lookup_pool.options().get_max_connections(),
            },
        }
    }

    /// Close all pools
    pub async fn close(&self) {
        self.search_pool.close().await;
        self.lookup_pool.close().await;
    }
}

/// Statistics for a connection pool
#[derive(Debug, Clone)]
pub struct ConnectionStats {
    /// Current number of connections
    pub size: u32,
    /// Number of idle connections
    pub idle: u32,
    /// Maximum connections allowed
    pub max: u32,
}

/// Combined statistics for all pools
#[derive(Debug, Clone)]
pub struct PoolStats {
    pub search_pool: ConnectionStats,
    pub lookup_pool: ConnectionStats,
}

impl PoolStats {
    /// Total connections across both pools
    pub const fn total_connections(&self) -> u32 {
        self.search_pool.size.saturating_add(self.lookup_pool.size)
    }

    /// Total idle connections
    pub const fn total_idle(&self) -> u32 {
        self.search_pool.idle.saturating_add(self.lookup_pool.idle)
    }
}
