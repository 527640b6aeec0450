//! Store repository trait for dependency injection and testing

use async_trait::async_trait;

use crate::error::DatabaseResult;
use crate::models::{
    DatasetStats, DomainPattern, MetadataFilters, Page, Sort, Technology, TechnologyCountMode,
    Website,
};

/// Read-only repository over the website/technology store.
///
/// Every retrieval method applies the same metadata facet filters inside its
/// query (rows and counts alike) and returns the page of matching websites
/// together with the strategy's total count. Implementations must resolve
/// each returned website's technology links.
#[async_trait]
pub trait WebsiteRepository: Send + Sync {
    /// Websites whose domain matches the pre-computed pattern
    /// (substring OR exact variants OR subdomain prefix, case-insensitive)
    async fn find_websites_by_domain(
        &self,
        pattern: &DomainPattern,
        filters: &MetadataFilters,
        sort: Sort,
        page: Page,
    ) -> DatabaseResult<(Vec<Website>, i64)>;

    /// Websites linked to a technology whose name contains `pattern`
    /// (case-insensitive). `count_mode` controls whether the total uses
    /// exact name equality or the same substring match as the rows.
    async fn find_websites_by_technology(
        &self,
        pattern: &str,
        count_mode: TechnologyCountMode,
        filters: &MetadataFilters,
        sort: Sort,
        page: Page,
    ) -> DatabaseResult<(Vec<Website>, i64)>;

    /// Websites linked to a technology in exactly this category
    /// (case-sensitive: categories are a closed vocabulary)
    async fn find_websites_by_category(
        &self,
        category: &str,
        filters: &MetadataFilters,
        sort: Sort,
        page: Page,
    ) -> DatabaseResult<(Vec<Website>, i64)>;

    /// All websites, constrained only by the metadata filters
    async fn find_websites_default(
        &self,
        filters: &MetadataFilters,
        sort: Sort,
        page: Page,
    ) -> DatabaseResult<(Vec<Website>, i64)>;

    /// Technologies whose name contains `pattern` (case-insensitive),
    /// store order, for "did you mean" suggestions
    async fn find_technologies_by_name(
        &self,
        pattern: &str,
        limit: i64,
    ) -> DatabaseResult<Vec<Technology>>;

    /// Aggregate dataset counts for the status endpoint
    async fn dataset_stats(&self) -> DatabaseResult<DatasetStats>;
}
