//! Domain models for store entities and query parameters

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Category assigned by the ingestion collaborator when a technology has no
/// curated category. Kept in one place so the sentinel never leaks into call
/// sites as a bare literal.
pub const DEFAULT_CATEGORY: &str = "Other";

/// A detected technology (framework, CMS, analytics, CDN, ...)
///
/// `name` is unique and matched case-insensitively; `category` values form a
/// closed vocabulary and compare case-sensitively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub struct Technology {
    #[cfg_attr(feature = "utoipa", schema(value_type = String))]
    pub id: Uuid,
    pub name: String,
    pub category: String,
}

/// Page metadata captured by the detection collaborator at scrape time.
///
/// Well-known facets get typed fields; anything else the collaborator emits
/// lands in `extra` so schema evolution on their side never breaks decoding
/// on ours.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub struct WebsiteMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_https: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_responsive: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub likely_spa: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_service_worker: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_load_time: Option<f64>,
    /// Unrecognized facet keys, preserved verbatim
    #[serde(flatten)]
    #[cfg_attr(feature = "utoipa", schema(value_type = Object))]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// A scraped website with its resolved technology links
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Website {
    pub id: Uuid,
    /// Normalized: lowercase, no scheme, no trailing slash, no `www.` prefix
    pub domain: String,
    pub last_scraped: DateTime<Utc>,
    pub metadata: WebsiteMetadata,
    pub technologies: Vec<Technology>,
}

/// Aggregate counts for the status endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetStats {
    pub websites: i64,
    pub technologies: i64,
    pub links: i64,
    pub last_scraped: Option<DateTime<Utc>>,
}

/// Sortable website columns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    Url,
    #[default]
    LastScraped,
    LoadTime,
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// Sort specification applied inside every retrieval strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Sort {
    pub field: SortField,
    pub order: SortOrder,
}

impl Sort {
    /// Build a sort from raw request parameters.
    ///
    /// Unknown or missing values silently fall back to the defaults
    /// (`last_scraped` descending); malformed input is never an error.
    pub fn from_params(field: Option<&str>, order: Option<&str>) -> Self {
        let field = match field {
            Some("url") => SortField::Url,
            Some("load_time") => SortField::LoadTime,
            _ => SortField::LastScraped,
        };
        let order = match order {
            Some("asc") => SortOrder::Asc,
            _ => SortOrder::Desc,
        };
        Self { field, order }
    }
}

/// One page of a paginated query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    /// 1-based page number
    pub number: i64,
    /// Rows per page
    pub size: i64,
}

impl Page {
    /// Page with both bounds clamped to sane values (`number >= 1`, `size >= 1`)
    pub fn new(number: i64, size: i64) -> Self {
        Self {
            number: number.max(1),
            size: size.max(1),
        }
    }

    /// First page of the given size (offset 0)
    pub fn first(size: i64) -> Self {
        Self::new(1, size)
    }

    /// Row offset for SQL `OFFSET`
    pub fn offset(&self) -> i64 {
        self.number.saturating_sub(1).saturating_mul(self.size)
    }
}

/// Boolean facet constraints, pushed into every strategy's SQL
///
/// `None` imposes no constraint. These are applied inside each retrieval
/// query (rows AND counts) rather than as a post-filter on merged results,
/// since pagination totals must reflect the filtered set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetadataFilters {
    pub https: Option<bool>,
    pub responsive: Option<bool>,
    pub spa: Option<bool>,
    pub service_worker: Option<bool>,
}

impl MetadataFilters {
    /// True when no facet is constrained
    pub const fn is_empty(&self) -> bool {
        self.https.is_none()
            && self.responsive.is_none()
            && self.spa.is_none()
            && self.service_worker.is_none()
    }

    /// In-memory equivalent of the SQL push-down, used by the mock repository
    pub fn matches(&self, metadata: &WebsiteMetadata) -> bool {
        fn check(wanted: Option<bool>, actual: Option<bool>) -> bool {
            wanted.is_none_or(|w| actual == Some(w))
        }
        check(self.https, metadata.is_https)
            && check(self.responsive, metadata.is_responsive)
            && check(self.spa, metadata.likely_spa)
            && check(self.service_worker, metadata.has_service_worker)
    }
}

/// How the technology strategy counts its total.
///
/// The count and the candidate list deliberately disagree when the caller
/// passed an explicit technology name: the count answers "how many websites
/// use exactly this technology" while the list shows every substring match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TechnologyCountMode {
    /// Exact case-insensitive name equality
    ExactName,
    /// Same substring match as the candidate list
    Substring,
}

/// Pre-computed domain match terms for a single query.
///
/// Built by the query classifier; the repository turns each field into one
/// OR-ed SQL condition. `exact` carries the cleaned query plus its
/// TLD-appended variants; `needle` drives the substring and subdomain
/// conditions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainPattern {
    /// Cleaned query for substring and `needle.*` subdomain matching
    pub needle: String,
    /// Exact-equality candidates (cleaned query and TLD variants)
    pub exact: Vec<String>,
}

impl DomainPattern {
    /// In-memory equivalent of the SQL conditions, used by the mock repository
    pub fn matches(&self, domain: &str) -> bool {
        let domain = domain.to_lowercase();
        domain.contains(&self.needle)
            || self.exact.iter().any(|e| e == &domain)
            || domain.starts_with(&format!("{}.", self.needle))
    }
}
