//! `PostgreSQL` repository implementation
//!
//! All retrieval strategies share the same shape: one dynamically-built
//! websites query for the page of rows, one matching count query, then a
//! single batched query resolving technology links for the returned page.
//! Metadata facet filters are appended to both the row and the count query,
//! never applied after the fact.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::{Postgres, QueryBuilder, Row};
use std::collections::HashMap;
use uuid::Uuid;

use crate::error::{DatabaseErrorExt, DatabaseOperation, DatabaseResult};
use crate::models::{
    DEFAULT_CATEGORY, DatasetStats, DomainPattern, MetadataFilters, Page, Sort, SortField,
    SortOrder, Technology, TechnologyCountMode, Website, WebsiteMetadata,
};
use crate::pool_manager::PoolManager;
use crate::traits::WebsiteRepository;

const SELECT_WEBSITES: &str = "SELECT w.id, w.domain, w.last_scraped, w.metadata FROM websites w WHERE ";
const COUNT_WEBSITES: &str = "SELECT COUNT(*) FROM websites w WHERE ";

/// Repository over the website/technology store backed by sqlx pools
pub struct PgWebsiteRepository {
    pools: PoolManager,
}

impl PgWebsiteRepository {
    /// Create new repository from an existing pool manager
    pub const fn new(pools: PoolManager) -> Self {
        Self { pools }
    }

    /// Create from environment configuration
    ///
    /// # Errors
    ///
    /// Returns an error if pool creation fails (unreachable server,
    /// bad credentials, timeout).
    pub async fn from_env() -> anyhow::Result<Self> {
        let pools = PoolManager::from_env().await?;
        Ok(Self::new(pools))
    }

    /// Run a rows+count query pair and resolve technology links for the page
    async fn fetch_websites(
        &self,
        mut rows_query: QueryBuilder<'_, Postgres>,
        mut count_query: QueryBuilder<'_, Postgres>,
        operation: DatabaseOperation,
    ) -> DatabaseResult<(Vec<Website>, i64)> {
        let pool = self.pools.search_pool();

        let rows = rows_query
            .build()
            .fetch_all(pool)
            .await
            .map_db_err(operation.clone(), None)?;

        let mut websites = rows
            .iter()
            .map(|row| website_from_row(row, &operation))
            .collect::<DatabaseResult<Vec<_>>>()?;

        let total: i64 = count_query
            .build_query_scalar()
            .fetch_one(pool)
            .await
            .map_db_err(operation, None)?;

        self.load_technology_links(&mut websites).await?;

        Ok((websites, total))
    }

    /// Resolve technology links for a page of websites in one batched query
    async fn load_technology_links(&self, websites: &mut [Website]) -> DatabaseResult<()> {
        if websites.is_empty() {
            return Ok(());
        }

        let operation = DatabaseOperation::LoadTechnologyLinks;
        let ids: Vec<Uuid> = websites.iter().map(|w| w.id).collect();

        let rows = sqlx::query(
            r"
            SELECT wt.website_id, t.id, t.name, t.category
            FROM website_technologies wt
            JOIN technologies t ON t.id = wt.technology_id
            WHERE wt.website_id = ANY($1)
            ORDER BY t.name
            ",
        )
        .bind(&ids)
        .fetch_all(self.pools.search_pool())
        .await
        .map_db_err(operation.clone(), None)?;

        let mut by_website: HashMap<Uuid, Vec<Technology>> = HashMap::new();
        for row in rows {
            let website_id: Uuid = row.try_get("website_id").map_db_err(operation.clone(), None)?;
            let technology = technology_from_row(&row, &operation)?;
            by_website.entry(website_id).or_default().push(technology);
        }

        for website in websites {
            website.technologies = by_website.remove(&website.id).unwrap_or_default();
        }

        Ok(())
    }
}

#[async_trait]
impl WebsiteRepository for PgWebsiteRepository {
    async fn find_websites_by_domain(
        &self,
        pattern: &DomainPattern,
        filters: &MetadataFilters,
        sort: Sort,
        page: Page,
    ) -> DatabaseResult<(Vec<Website>, i64)> {
        let operation = DatabaseOperation::FindWebsitesByDomain {
            pattern: pattern.needle.clone(),
        };

        let mut rows_query = QueryBuilder::new(SELECT_WEBSITES);
        push_domain_condition(&mut rows_query, pattern);
        push_metadata_filters(&mut rows_query, filters);
        push_order_and_page(&mut rows_query, sort, page);

        let mut count_query = QueryBuilder::new(COUNT_WEBSITES);
        push_domain_condition(&mut count_query, pattern);
        push_metadata_filters(&mut count_query, filters);

        self.fetch_websites(rows_query, count_query, operation).await
    }

    async fn find_websites_by_technology(
        &self,
        pattern: &str,
        count_mode: TechnologyCountMode,
        filters: &MetadataFilters,
        sort: Sort,
        page: Page,
    ) -> DatabaseResult<(Vec<Website>, i64)> {
        let operation = DatabaseOperation::FindWebsitesByTechnology {
            pattern: pattern.to_string(),
        };

        let mut rows_query = QueryBuilder::new(SELECT_WEBSITES);
        push_technology_condition(&mut rows_query, pattern, TechnologyCountMode::Substring);
        push_metadata_filters(&mut rows_query, filters);
        push_order_and_page(&mut rows_query, sort, page);

        // The count may intentionally be narrower than the row match: for an
        // explicit technology parameter it answers "how many websites use
        // exactly this technology" while the rows show every substring match.
        let mut count_query = QueryBuilder::new(COUNT_WEBSITES);
        push_technology_condition(&mut count_query, pattern, count_mode);
        push_metadata_filters(&mut count_query, filters);

        self.fetch_websites(rows_query, count_query, operation).await
    }

    async fn find_websites_by_category(
        &self,
        category: &str,
        filters: &MetadataFilters,
        sort: Sort,
        page: Page,
    ) -> DatabaseResult<(Vec<Website>, i64)> {
        let operation = DatabaseOperation::FindWebsitesByCategory {
            category: category.to_string(),
        };

        let mut rows_query = QueryBuilder::new(SELECT_WEBSITES);
        push_category_condition(&mut rows_query, category);
        push_metadata_filters(&mut rows_query, filters);
        push_order_and_page(&mut rows_query, sort, page);

        let mut count_query = QueryBuilder::new(COUNT_WEBSITES);
        push_category_condition(&mut count_query, category);
        push_metadata_filters(&mut count_query, filters);

        self.fetch_websites(rows_query, count_query, operation).await
    }

    async fn find_websites_default(
        &self,
        filters: &MetadataFilters,
        sort: Sort,
        page: Page,
    ) -> DatabaseResult<(Vec<Website>, i64)> {
        let operation = DatabaseOperation::FindWebsitesDefault;

        let mut rows_query = QueryBuilder::new(SELECT_WEBSITES);
        rows_query.push("TRUE");
        push_metadata_filters(&mut rows_query, filters);
        push_order_and_page(&mut rows_query, sort, page);

        let mut count_query = QueryBuilder::new(COUNT_WEBSITES);
        count_query.push("TRUE");
        push_metadata_filters(&mut count_query, filters);

        self.fetch_websites(rows_query, count_query, operation).await
    }

    async fn find_technologies_by_name(
        &self,
        pattern: &str,
        limit: i64,
    ) -> DatabaseResult<Vec<Technology>> {
        let operation = DatabaseOperation::FindTechnologiesByName {
            pattern: pattern.to_string(),
        };

        let rows = sqlx::query(
            r"
            SELECT id, name, category
            FROM technologies
            WHERE name ILIKE $1
            LIMIT $2
            ",
        )
        .bind(format!("%{pattern}%"))
        .bind(limit)
        .fetch_all(self.pools.lookup_pool())
        .await
        .map_db_err(operation.clone(), None)?;

        rows.iter()
            .map(|row| technology_from_row(row, &operation))
            .collect()
    }

    async fn dataset_stats(&self) -> DatabaseResult<DatasetStats> {
        let operation = DatabaseOperation::DatasetStats;

        let row = sqlx::query(
            r"
            SELECT
                (SELECT COUNT(*) FROM websites) AS websites,
                (SELECT COUNT(*) FROM technologies) AS technologies,
                (SELECT COUNT(*) FROM website_technologies) AS links,
                (SELECT MAX(last_scraped) FROM websites) AS last_scraped
            ",
        )
        .fetch_one(self.pools.lookup_pool())
        .await
        .map_db_err(operation.clone(), None)?;

        Ok(DatasetStats {
            websites: row.try_get("websites").map_db_err(operation.clone(), None)?,
            technologies: row
                .try_get("technologies")
                .map_db_err(operation.clone(), None)?,
            links: row.try_get("links").map_db_err(operation.clone(), None)?,
            last_scraped: row
                .try_get("last_scraped")
                .map_db_err(operation, None)?,
        })
    }
}

/// Decode one technologies row.
///
/// Ingestion leaves `category` NULL when a technology has no curated
/// category; the sentinel is applied here, at the store boundary, and
/// nowhere else.
fn technology_from_row(row: &PgRow, operation: &DatabaseOperation) -> DatabaseResult<Technology> {
    let category: Option<String> = row
        .try_get("category")
        .map_db_err(operation.clone(), None)?;
    Ok(Technology {
        id: row.try_get("id").map_db_err(operation.clone(), None)?,
        name: row.try_get("name").map_db_err(operation.clone(), None)?,
        category: category.unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
    })
}

/// Decode one websites row; technology links are resolved separately
fn website_from_row(row: &PgRow, operation: &DatabaseOperation) -> DatabaseResult<Website> {
    let metadata: Option<Json<WebsiteMetadata>> = row
        .try_get("metadata")
        .map_db_err(operation.clone(), None)?;

    Ok(Website {
        id: row.try_get("id").map_db_err(operation.clone(), None)?,
        domain: row.try_get("domain").map_db_err(operation.clone(), None)?,
        last_scraped: row
            .try_get("last_scraped")
            .map_db_err(operation.clone(), None)?,
        metadata: metadata.map(|m| m.0).unwrap_or_default(),
        technologies: Vec::new(),
    })
}

/// Domain strategy condition: substring OR exact variants OR subdomain prefix,
/// all OR-ed into one parenthesized clause (case-insensitive)
fn push_domain_condition(query: &mut QueryBuilder<'_, Postgres>, pattern: &DomainPattern) {
    query.push("(w.domain ILIKE ");
    query.push_bind(format!("%{}%", pattern.needle));
    query.push(" OR w.domain = ANY(");
    query.push_bind(pattern.exact.clone());
    query.push(") OR w.domain ILIKE ");
    query.push_bind(format!("{}.%", pattern.needle));
    query.push(")");
}

/// Technology strategy condition via the link table.
///
/// Substring mode matches names case-insensitively; exact mode compares
/// lowercased names for equality.
fn push_technology_condition(
    query: &mut QueryBuilder<'_, Postgres>,
    pattern: &str,
    mode: TechnologyCountMode,
) {
    query.push(
        "w.id IN (SELECT wt.website_id FROM website_technologies wt \
         JOIN technologies t ON t.id = wt.technology_id WHERE ",
    );
    match mode {
        TechnologyCountMode::Substring => {
            query.push("t.name ILIKE ");
            query.push_bind(format!("%{pattern}%"));
        }
        TechnologyCountMode::ExactName => {
            query.push("LOWER(t.name) = LOWER(");
            query.push_bind(pattern.to_string());
            query.push(")");
        }
    }
    query.push(")");
}

/// Category strategy condition: exact, case-sensitive equality
/// (categories are a closed vocabulary)
fn push_category_condition(query: &mut QueryBuilder<'_, Postgres>, category: &str) {
    query.push(
        "w.id IN (SELECT wt.website_id FROM website_technologies wt \
         JOIN technologies t ON t.id = wt.technology_id WHERE t.category = ",
    );
    query.push_bind(category.to_string());
    query.push(")");
}

/// Append the facet constraints shared by every strategy
fn push_metadata_filters(query: &mut QueryBuilder<'_, Postgres>, filters: &MetadataFilters) {
    let facets = [
        ("is_https", filters.https),
        ("is_responsive", filters.responsive),
        ("likely_spa", filters.spa),
        ("has_service_worker", filters.service_worker),
    ];
    for (key, wanted) in facets {
        if let Some(wanted) = wanted {
            query.push(format!(" AND (w.metadata ->> '{key}')::boolean = "));
            query.push_bind(wanted);
        }
    }
}

/// Append ORDER BY / LIMIT / OFFSET for the active sort and page
fn push_order_and_page(query: &mut QueryBuilder<'_, Postgres>, sort: Sort, page: Page) {
    let column = match sort.field {
        SortField::Url => "w.domain",
        SortField::LastScraped => "w.last_scraped",
        SortField::LoadTime => "(w.metadata ->> 'page_load_time')::double precision",
    };
    let direction = match sort.order {
        SortOrder::Asc => "ASC",
        SortOrder::Desc => "DESC",
    };
    query.push(format!(" ORDER BY {column} {direction} NULLS LAST"));
    query.push(" LIMIT ");
    query.push_bind(page.size);
    query.push(" OFFSET ");
    query.push_bind(page.offset());
}
