//! Stacklens search resolution crate
//!
//! Resolves a single free-text query against the website/technology store:
//! classifies the query, fans retrieval strategies out concurrently, merges
//! and deduplicates their candidates, computes pagination totals across the
//! heterogeneous paths, and falls back to "did you mean" suggestions when
//! nothing matched.

pub mod error;
pub mod merge;
pub mod pagination;
pub mod plan;
pub mod service;

// Re-export main types
pub use error::{SearchError, SearchResult};
pub use merge::{Candidate, MatchSource, merge_combined};
pub use pagination::{PageInfo, combined_total};
pub use plan::{COMMON_TLDS, RetrievalPlan, domain_pattern, is_url_like, normalize_domain};
pub use service::{SearchOutcome, SearchProvider, SearchRequest, SearchService, Suggestion};
