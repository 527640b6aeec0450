use stacklens_store::DatabaseError;
use thiserror::Error;

/// Search-specific error types.
///
/// A failed store query is fatal for the whole request: when one half of a
/// combined search fails there is no partial envelope, since dropping a
/// strategy would corrupt the merged totals and duplicate suppression.
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Store query failed: {0}")]
    Store(#[from] DatabaseError),
}

impl SearchError {
    /// True when the underlying failure is lost connectivity rather than a
    /// bad query, so the transport layer can answer 503 instead of 500
    pub fn is_connectivity(&self) -> bool {
        match self {
            Self::Store(err) => err.is_connectivity(),
        }
    }
}

/// Specialized result type for search operations
pub type SearchResult<T> = std::result::Result<T, SearchError>;
