//! Stacklens data layer for the `PostgreSQL` website/technology store
//!
//! This crate owns the boundary to the relational store: domain models,
//! the repository trait the search engine consumes, the sqlx-backed
//! implementation, and an in-memory mock for tests. The store is strictly
//! read-only from this crate's perspective; ingestion is a separate
//! collaborator.

// Module declarations
pub mod client;
pub mod error;
pub mod models;
pub mod pool_manager;
pub mod repository;
pub mod traits;

pub mod mock;
pub use mock::MockWebsiteRepository;

// Public exports
pub use client::StoreClient;
// Use unified DatabaseConfig from stacklens-config
pub use stacklens_config::DatabaseConfig;
pub use error::{DatabaseError, DatabaseErrorExt, DatabaseOperation, DatabaseResult};
pub use models::{
    DEFAULT_CATEGORY, DatasetStats, DomainPattern, MetadataFilters, Page, Sort, SortField,
    SortOrder, Technology, TechnologyCountMode, Website, WebsiteMetadata,
};
pub use pool_manager::{PoolConfig, PoolManager};
pub use repository::PgWebsiteRepository;
pub use traits::WebsiteRepository;
