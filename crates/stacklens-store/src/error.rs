//! Database error taxonomy with operation context

use stacklens_common::CorrelationId;
use thiserror::Error;

/// The store operation that was in flight when an error occurred.
///
/// Carried inside every [`DatabaseError`] so a failure log line names the
/// query that failed, not just the sqlx error text.
#[derive(Debug, Clone)]
pub enum DatabaseOperation {
    FindWebsitesByDomain { pattern: String },
    FindWebsitesByTechnology { pattern: String },
    FindWebsitesByCategory { category: String },
    FindWebsitesDefault,
    FindTechnologiesByName { pattern: String },
    LoadTechnologyLinks,
    DatasetStats,
    Query { description: String },
}

impl std::fmt::Display for DatabaseOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FindWebsitesByDomain { pattern } => {
                write!(f, "find_websites_by_domain({pattern})")
            }
            Self::FindWebsitesByTechnology { pattern } => {
                write!(f, "find_websites_by_technology({pattern})")
            }
            Self::FindWebsitesByCategory { category } => {
                write!(f, "find_websites_by_category({category})")
            }
            Self::FindWebsitesDefault => write!(f, "find_websites_default"),
            Self::FindTechnologiesByName { pattern } => {
                write!(f, "find_technologies_by_name({pattern})")
            }
            Self::LoadTechnologyLinks => write!(f, "load_technology_links"),
            Self::DatasetStats => write!(f, "dataset_stats"),
            Self::Query { description } => write!(f, "{description}"),
        }
    }
}

/// Errors surfaced by the store layer
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// A query failed at the sqlx level (connection, syntax, decode, ...)
    #[error("Query failed during {operation}: {source}")]
    QueryFailed {
        operation: Box<DatabaseOperation>,
        #[source]
        source: sqlx::Error,
        correlation_id: Option<CorrelationId>,
    },

    /// Connecting to the database failed outright
    #[error("Database connection failed: {message}")]
    ConnectionFailed { message: String },

    /// The store returned data this crate cannot interpret
    #[error("Unexpected state during {operation}: {message}")]
    UnexpectedState {
        operation: Box<DatabaseOperation>,
        message: String,
        correlation_id: Option<CorrelationId>,
    },
}

impl DatabaseError {
    /// True when the failure looks like lost connectivity rather than a bad query
    pub fn is_connectivity(&self) -> bool {
        match self {
            Self::ConnectionFailed { .. } => true,
            Self::QueryFailed { source, .. } => matches!(
                source,
                sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed
            ),
            Self::UnexpectedState { .. } => false,
        }
    }
}

/// Specialized result type for store operations
pub type DatabaseResult<T> = std::result::Result<T, DatabaseError>;

/// Extension trait mapping raw sqlx errors into [`DatabaseError`] with
/// operation context attached
pub trait DatabaseErrorExt<T> {
    /// Attach the failing operation (and optional correlation id) to a sqlx error
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError::QueryFailed`] wrapping the original error.
    fn map_db_err(
        self,
        operation: DatabaseOperation,
        correlation_id: Option<CorrelationId>,
    ) -> DatabaseResult<T>;
}

impl<T> DatabaseErrorExt<T> for std::result::Result<T, sqlx::Error> {
    fn map_db_err(
        self,
        operation: DatabaseOperation,
        correlation_id: Option<CorrelationId>,
    ) -> DatabaseResult<T> {
        self.map_err(|source| DatabaseError::QueryFailed {
            operation: Box::new(operation),
            source,
            correlation_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_names_the_operation() {
        let err: DatabaseResult<()> = Err(sqlx::Error::PoolTimedOut).map_db_err(
            DatabaseOperation::FindWebsitesByCategory {
                category: "CDN".to_string(),
            },
            None,
        );
        let message = err.unwrap_err().to_string();
        assert!(message.contains("find_websites_by_category(CDN)"));
    }

    #[test]
    fn pool_timeouts_count_as_connectivity_failures() {
        let err: DatabaseResult<()> = Err(sqlx::Error::PoolTimedOut)
            .map_db_err(DatabaseOperation::FindWebsitesDefault, None);
        assert!(err.unwrap_err().is_connectivity());
    }
}
