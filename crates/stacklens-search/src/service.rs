//! Search resolution service
//!
//! Single-pass, stateless pipeline per request:
//! classify → retrieve (concurrent for the combined plan) → merge →
//! paginate → suggest (only on empty, query-driven results). Facet filters
//! are pushed into every store query by the repository, so totals always
//! reflect the filtered set.

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::SearchResult;
use crate::merge::{Candidate, MatchSource, merge_combined};
use crate::pagination::{PageInfo, combined_total};
use crate::plan::RetrievalPlan;
use stacklens_common::CorrelationId;
use stacklens_config::SearchConfig;
use stacklens_store::{MetadataFilters, Page, Sort, TechnologyCountMode, WebsiteRepository};

/// One resolved search request, already coerced to usable values by the
/// transport layer (malformed input never reaches this far as an error)
#[derive(Debug, Clone, Default)]
pub struct SearchRequest {
    /// Free-text query: domain-or-technology
    pub query: Option<String>,
    /// Explicit technology name filter
    pub tech: Option<String>,
    /// Explicit category filter (wins over `query`/`tech`)
    pub category: Option<String>,
    /// Sort specification, already defaulted
    pub sort: Sort,
    /// 1-based page number
    pub page: i64,
    /// Page size; `None` uses the configured default
    pub limit: Option<i64>,
    /// Boolean facet constraints
    pub filters: MetadataFilters,
}

/// A "did you mean" fallback produced when nothing matched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    pub name: String,
    pub category: String,
    pub hint: String,
}

/// The engine's result envelope, rendered to JSON by the API layer
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub candidates: Vec<Candidate>,
    pub page_info: PageInfo,
    pub suggestions: Vec<Suggestion>,
}

/// Search resolution boundary, object-safe for dependency injection
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Resolve one request against the store.
    ///
    /// # Errors
    ///
    /// Returns [`crate::SearchError`] when any required store query fails;
    /// a partial failure in the combined plan fails the whole request.
    async fn search(
        &self,
        request: &SearchRequest,
        correlation_id: &CorrelationId,
    ) -> SearchResult<SearchOutcome>;
}

/// Default [`SearchProvider`] over a [`WebsiteRepository`]
pub struct SearchService {
    repository: Arc<dyn WebsiteRepository>,
    config: SearchConfig,
}

impl SearchService {
    /// Create a search service over the given repository
    pub fn new(repository: Arc<dyn WebsiteRepository>, config: SearchConfig) -> Self {
        Self { repository, config }
    }

    /// Clamp page/limit to usable bounds
    fn page_bounds(&self, request: &SearchRequest) -> (i64, i64) {
        let page = request.page.max(1);
        let limit = request
            .limit
            .unwrap_or(self.config.default_page_size)
            .clamp(1, self.config.max_page_size);
        (page, limit)
    }

    /// Fuzzy technology-name lookup feeding the empty-result fallback
    async fn suggestions_for(&self, plan: &RetrievalPlan) -> SearchResult<Vec<Suggestion>> {
        let Some(needle) = plan.suggestion_needle() else {
            return Ok(Vec::new());
        };
        let needle = needle.trim();
        if needle.is_empty() {
            return Ok(Vec::new());
        }

        let technologies = self
            .repository
            .find_technologies_by_name(needle, self.config.suggestion_limit)
            .await?;

        Ok(technologies
            .into_iter()
            .map(|technology| Suggestion {
                hint: format!("Search for websites using {}", technology.name),
                name: technology.name,
                category: technology.category,
            })
            .collect())
    }
}

#[async_trait]
impl SearchProvider for SearchService {
    #[tracing::instrument(skip(self, request), fields(correlation_id, plan))]
    async fn search(
        &self,
        request: &SearchRequest,
        correlation_id: &CorrelationId,
    ) -> SearchResult<SearchOutcome> {
        tracing::Span::current().record("correlation_id", correlation_id.to_string());

        let (page_number, limit) = self.page_bounds(request);
        let plan = RetrievalPlan::classify(
            request.query.as_deref(),
            request.tech.as_deref(),
            request.category.as_deref(),
        );

        let (candidates, total) = match &plan {
            RetrievalPlan::Category { category } => {
                tracing::Span::current().record("plan", "category");
                let (rows, total) = self
                    .repository
                    .find_websites_by_category(
                        category,
                        &request.filters,
                        request.sort,
                        Page::new(page_number, limit),
                    )
                    .await?;
                (Candidate::tag_all(rows, MatchSource::Category), total)
            }
            RetrievalPlan::Technology { pattern } => {
                tracing::Span::current().record("plan", "technology");
                // Exact-name count, substring rows: the count answers "how
                // many websites use exactly this technology"
                let (rows, total) = self
                    .repository
                    .find_websites_by_technology(
                        pattern,
                        TechnologyCountMode::ExactName,
                        &request.filters,
                        request.sort,
                        Page::new(page_number, limit),
                    )
                    .await?;
                (Candidate::tag_all(rows, MatchSource::Technology), total)
            }
            RetrievalPlan::Combined { query, pattern, .. } => {
                tracing::Span::current().record("plan", "combined");
                // Both candidate fetches run concurrently into independent
                // buffers; either failure fails the whole request. The
                // technology page always starts at offset 0 - its rows
                // backfill whatever the domain page leaves open.
                let domain = self.repository.find_websites_by_domain(
                    pattern,
                    &request.filters,
                    request.sort,
                    Page::new(page_number, limit),
                );
                let technology = self.repository.find_websites_by_technology(
                    query,
                    TechnologyCountMode::Substring,
                    &request.filters,
                    request.sort,
                    Page::first(limit),
                );
                let ((domain_rows, domain_total), (technology_rows, technology_total)) =
                    tokio::try_join!(domain, technology)?;

                let merged = merge_combined(
                    domain_rows,
                    technology_rows,
                    usize::try_from(limit).unwrap_or(usize::MAX),
                );
                (merged, combined_total(domain_total, technology_total))
            }
            RetrievalPlan::Default => {
                tracing::Span::current().record("plan", "default");
                let (rows, total) = self
                    .repository
                    .find_websites_default(
                        &request.filters,
                        request.sort,
                        Page::new(page_number, limit),
                    )
                    .await?;
                (Candidate::tag_all(rows, MatchSource::Default), total)
            }
        };

        let suggestions = if candidates.is_empty() {
            self.suggestions_for(&plan).await?
        } else {
            Vec::new()
        };

        tracing::debug!(
            correlation_id = %correlation_id,
            result_count = candidates.len(),
            total,
            suggestion_count = suggestions.len(),
            "Search resolved"
        );

        Ok(SearchOutcome {
            candidates,
            page_info: PageInfo::new(page_number, limit, total),
            suggestions,
        })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)] // OK in tests
    #![allow(clippy::expect_used)] // OK in tests

    use super::*;
    use chrono::{TimeZone, Utc};
    use stacklens_store::{MockWebsiteRepository, Technology, Website, WebsiteMetadata};
    use uuid::Uuid;

    fn config() -> SearchConfig {
        SearchConfig {
            default_page_size: 20,
            max_page_size: 100,
            suggestion_limit: 5,
        }
    }

    fn service(mock: MockWebsiteRepository) -> SearchService {
        SearchService::new(Arc::new(mock), config())
    }

    fn tech(name: &str, category: &str) -> Technology {
        Technology {
            id: Uuid::new_v4(),
            name: name.to_string(),
            category: category.to_string(),
        }
    }

    fn website(domain: &str, technologies: Vec<Technology>, hour: u32) -> Website {
        Website {
            id: Uuid::new_v4(),
            domain: domain.to_string(),
            last_scraped: Utc.with_ymd_and_hms(2026, 5, 1, hour, 0, 0).unwrap(),
            metadata: WebsiteMetadata::default(),
            technologies,
        }
    }

    fn https_website(domain: &str, technologies: Vec<Technology>, https: bool) -> Website {
        let mut site = website(domain, technologies, 0);
        site.metadata.is_https = Some(https);
        site
    }

    fn request(query: &str) -> SearchRequest {
        SearchRequest {
            query: Some(query.to_string()),
            page: 1,
            ..SearchRequest::default()
        }
    }

    #[tokio::test]
    async fn url_like_query_resolves_the_website_with_its_technologies() {
        // A store holding shopify.com using Shopify and Cloudflare
        let mock = MockWebsiteRepository::with_websites(vec![
            website(
                "shopify.com",
                vec![tech("Shopify", "Ecommerce"), tech("Cloudflare", "CDN")],
                1,
            ),
            website("example.org", vec![tech("WordPress", "CMS")], 2),
        ]);
        let service = service(mock);

        let outcome = service
            .search(&request("shopify.com"), &CorrelationId::new())
            .await
            .unwrap();

        assert_eq!(outcome.candidates.len(), 1);
        let candidate = &outcome.candidates[0];
        assert_eq!(candidate.website.domain, "shopify.com");
        assert_eq!(candidate.website.technologies.len(), 2);
        assert_eq!(outcome.page_info.total, 1);
    }

    #[tokio::test]
    async fn explicit_tech_keeps_exact_count_but_substring_rows() {
        let react = tech("React", "JavaScript frameworks");
        let mock = MockWebsiteRepository::with_websites(vec![
            website("a.com", vec![react.clone()], 1),
            website("b.com", vec![react.clone()], 2),
            website("c.com", vec![react], 3),
            website("d.com", vec![tech("React Native", "Mobile frameworks")], 4),
        ]);
        let service = service(mock);

        let outcome = service
            .search(
                &SearchRequest {
                    tech: Some("React".to_string()),
                    page: 1,
                    ..SearchRequest::default()
                },
                &CorrelationId::new(),
            )
            .await
            .unwrap();

        assert_eq!(outcome.candidates.len(), 4, "rows include substring matches");
        assert_eq!(outcome.page_info.total, 3, "count is exact-name only");
    }

    #[tokio::test]
    async fn typo_query_yields_suggestions_only_when_substring_matches() {
        // React exists in the technology table but no website links to it
        let mock = MockWebsiteRepository::new();
        mock.add_technology(tech("React", "JavaScript frameworks"));
        let service = service(mock);

        // "reac" is a substring of "React"
        let outcome = service
            .search(&request("reac"), &CorrelationId::new())
            .await
            .unwrap();
        assert!(outcome.candidates.is_empty());
        assert_eq!(outcome.suggestions.len(), 1);
        let suggestion = &outcome.suggestions[0];
        assert_eq!(suggestion.name, "React");
        assert_eq!(suggestion.hint, "Search for websites using React");

        // "reakt" is not a substring of anything
        let outcome = service
            .search(&request("reakt"), &CorrelationId::new())
            .await
            .unwrap();
        assert!(outcome.candidates.is_empty());
        assert!(outcome.suggestions.is_empty());
    }

    #[tokio::test]
    async fn category_with_https_filter_pushes_both_constraints() {
        let cdn = tech("Cloudflare", "CDN");
        let mock = MockWebsiteRepository::with_websites(vec![
            https_website("secure-cdn.com", vec![cdn.clone()], true),
            https_website("plain-cdn.com", vec![cdn], false),
            https_website("secure-cms.com", vec![tech("WordPress", "CMS")], true),
        ]);
        let service = service(mock);

        let outcome = service
            .search(
                &SearchRequest {
                    category: Some("CDN".to_string()),
                    page: 1,
                    filters: MetadataFilters {
                        https: Some(true),
                        ..MetadataFilters::default()
                    },
                    ..SearchRequest::default()
                },
                &CorrelationId::new(),
            )
            .await
            .unwrap();

        assert_eq!(outcome.candidates.len(), 1);
        for candidate in &outcome.candidates {
            assert_eq!(candidate.website.metadata.is_https, Some(true));
            assert!(
                candidate
                    .website
                    .technologies
                    .iter()
                    .any(|t| t.category == "CDN")
            );
        }
        assert_eq!(outcome.page_info.total, 1);
    }

    #[tokio::test]
    async fn default_plan_paginates_fifteen_rows_across_two_pages() {
        let sites: Vec<Website> = (0..15)
            .map(|i| website(&format!("site-{i:02}.com"), vec![], i))
            .collect();
        let mock = MockWebsiteRepository::with_websites(sites);
        let service = service(mock);

        let outcome = service
            .search(
                &SearchRequest {
                    page: 2,
                    limit: Some(10),
                    ..SearchRequest::default()
                },
                &CorrelationId::new(),
            )
            .await
            .unwrap();

        assert_eq!(outcome.candidates.len(), 5);
        assert_eq!(outcome.page_info.total, 15);
        assert_eq!(outcome.page_info.total_pages, 2);
        // The default plan never produces suggestions, even on later pages
        assert!(outcome.suggestions.is_empty());
    }

    #[tokio::test]
    async fn combined_results_dedup_by_identity_with_domain_first() {
        let react = tech("React", "JavaScript frameworks");
        // react.dev matches BOTH strategies for the query "react"
        let both = website("react.dev", vec![react.clone()], 5);
        let mock = MockWebsiteRepository::with_websites(vec![
            both,
            website("react-tutorials.com", vec![tech("WordPress", "CMS")], 4),
            website("unrelated.io", vec![react], 9),
        ]);
        let service = service(mock);

        let outcome = service
            .search(&request("react"), &CorrelationId::new())
            .await
            .unwrap();

        // No two entries share a website identity
        let mut ids: Vec<Uuid> = outcome.candidates.iter().map(|c| c.website.id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), outcome.candidates.len());

        // Every domain-origin candidate precedes every technology-only one
        let first_technology = outcome
            .candidates
            .iter()
            .position(|c| c.source == MatchSource::Technology);
        let last_domain = outcome
            .candidates
            .iter()
            .rposition(|c| c.source == MatchSource::Domain);
        if let (Some(first_technology), Some(last_domain)) = (first_technology, last_domain) {
            assert!(last_domain < first_technology);
        }

        // react.dev matched both ways but keeps its domain provenance
        let both = outcome
            .candidates
            .iter()
            .find(|c| c.website.domain == "react.dev")
            .expect("react.dev should be in the results");
        assert_eq!(both.source, MatchSource::Domain);
    }

    #[tokio::test]
    async fn combined_total_is_max_of_both_strategies() {
        let react = tech("React", "JavaScript frameworks");
        // 1 domain match, 3 technology matches, no overlap
        let mock = MockWebsiteRepository::with_websites(vec![
            website("acme.com", vec![tech("Vue", "JavaScript frameworks")], 1),
            website("one.org", vec![react.clone()], 2),
            website("two.org", vec![react.clone()], 3),
            website("three.org", vec![react], 4),
        ]);
        let service = service(mock);

        let outcome = service
            .search(&request("acme"), &CorrelationId::new())
            .await
            .unwrap();
        // Domain strategy finds acme.com; technology strategy finds nothing
        // for "acme", so the total is the domain count
        assert_eq!(outcome.page_info.total, 1);

        let outcome = service
            .search(&request("react"), &CorrelationId::new())
            .await
            .unwrap();
        assert_eq!(outcome.page_info.total, 3);
    }

    #[tokio::test]
    async fn out_of_range_page_returns_empty_rows_with_accurate_totals() {
        let mock = MockWebsiteRepository::with_websites(vec![
            website("a.com", vec![], 1),
            website("b.com", vec![], 2),
        ]);
        let service = service(mock);

        let outcome = service
            .search(
                &SearchRequest {
                    page: 7,
                    limit: Some(10),
                    ..SearchRequest::default()
                },
                &CorrelationId::new(),
            )
            .await
            .unwrap();

        assert!(outcome.candidates.is_empty());
        assert_eq!(outcome.page_info.total, 2);
        assert_eq!(outcome.page_info.total_pages, 1);
        assert_eq!(outcome.page_info.page, 7);
    }

    #[tokio::test]
    async fn partial_strategy_failure_fails_the_whole_request() {
        let mock = MockWebsiteRepository::with_websites(vec![website(
            "shopify.com",
            vec![tech("Shopify", "Ecommerce")],
            1,
        )]);
        // First store call fails; in a combined search that poisons the
        // entire request even though the sibling strategy could succeed
        mock.fail_next("connection reset");
        let service = service(mock);

        let result = service
            .search(&request("shopify"), &CorrelationId::new())
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn limit_is_clamped_to_the_configured_maximum() {
        let sites: Vec<Website> = (0..150u32)
            .map(|i| website(&format!("bulk-{i:03}.com"), vec![], i % 24))
            .collect();
        let mock = MockWebsiteRepository::with_websites(sites);
        let service = service(mock);

        let outcome = service
            .search(
                &SearchRequest {
                    limit: Some(5000),
                    page: 1,
                    ..SearchRequest::default()
                },
                &CorrelationId::new(),
            )
            .await
            .unwrap();

        assert_eq!(outcome.candidates.len(), 100);
        assert_eq!(outcome.page_info.limit, 100);
    }

    #[tokio::test]
    async fn suggestions_are_capped_and_all_contain_the_query() {
        let mock = MockWebsiteRepository::new();
        for name in [
            "JavaScript",
            "TypeScript",
            "CoffeeScript",
            "PureScript",
            "ActionScript",
            "AppleScript",
            "PostScript",
        ] {
            mock.add_technology(tech(name, "Programming languages"));
        }
        let service = service(mock);

        let outcome = service
            .search(&request("script"), &CorrelationId::new())
            .await
            .unwrap();

        assert!(outcome.candidates.is_empty());
        assert!(outcome.suggestions.len() <= 5);
        assert!(!outcome.suggestions.is_empty());
        for suggestion in &outcome.suggestions {
            assert!(suggestion.name.to_lowercase().contains("script"));
        }
    }

    #[tokio::test]
    async fn empty_category_results_produce_no_suggestions() {
        let mock = MockWebsiteRepository::new();
        mock.add_technology(tech("Cloudflare", "CDN"));
        let service = service(mock);

        let outcome = service
            .search(
                &SearchRequest {
                    category: Some("Obscure".to_string()),
                    page: 1,
                    ..SearchRequest::default()
                },
                &CorrelationId::new(),
            )
            .await
            .unwrap();

        assert!(outcome.candidates.is_empty());
        assert!(outcome.suggestions.is_empty());
        assert_eq!(outcome.page_info.total_pages, 0);
    }

    #[tokio::test]
    async fn category_wins_over_query_and_tech() {
        let mock = MockWebsiteRepository::with_websites(vec![
            https_website("cdn-site.com", vec![tech("Fastly", "CDN")], true),
            https_website("react-site.com", vec![tech("React", "JavaScript frameworks")], true),
        ]);
        let service = service(mock);

        let outcome = service
            .search(
                &SearchRequest {
                    query: Some("react-site.com".to_string()),
                    tech: Some("React".to_string()),
                    category: Some("CDN".to_string()),
                    page: 1,
                    ..SearchRequest::default()
                },
                &CorrelationId::new(),
            )
            .await
            .unwrap();

        assert_eq!(outcome.candidates.len(), 1);
        assert_eq!(outcome.candidates[0].website.domain, "cdn-site.com");
        assert_eq!(outcome.candidates[0].source, MatchSource::Category);
    }
}
