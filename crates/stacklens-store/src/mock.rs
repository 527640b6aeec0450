//! Mock implementation of `WebsiteRepository` for testing

// Allow test-specific patterns in mock implementation
#![allow(clippy::unwrap_used)] // Mocks can panic on lock poisoning
#![allow(clippy::expect_used)] // Test code can use expect
#![allow(clippy::arithmetic_side_effects)] // Test counters can overflow

use async_trait::async_trait;
use std::cmp::Ordering;
use std::sync::{Arc, Mutex};

use crate::error::{DatabaseError, DatabaseOperation, DatabaseResult};
use crate::models::{
    DatasetStats, DomainPattern, MetadataFilters, Page, Sort, SortField, SortOrder, Technology,
    TechnologyCountMode, Website,
};
use crate::traits::WebsiteRepository;

// Type aliases to simplify complex types
type WebsiteList = Arc<Mutex<Vec<Website>>>;
type TechnologyList = Arc<Mutex<Vec<Technology>>>;

/// In-memory repository mirroring the SQL semantics of the real one.
///
/// Websites are stored with their technology links already resolved;
/// the standalone technology list feeds the suggestion lookup.
#[derive(Clone, Default)]
pub struct MockWebsiteRepository {
    pub websites: WebsiteList,
    pub technologies: TechnologyList,

    // Behavior controls for testing
    pub should_fail_next: Arc<Mutex<bool>>,
    pub error_message: Arc<Mutex<String>>,
}

impl MockWebsiteRepository {
    /// Create an empty mock repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed websites (their `technologies` field is the link table)
    pub fn with_websites(websites: Vec<Website>) -> Self {
        let mock = Self::new();
        let mut technologies: Vec<Technology> = Vec::new();
        for website in &websites {
            for tech in &website.technologies {
                if !technologies.iter().any(|t| t.id == tech.id) {
                    technologies.push(tech.clone());
                }
            }
        }
        *mock.websites.lock().unwrap() = websites;
        *mock.technologies.lock().unwrap() = technologies;
        mock
    }

    /// Register a technology that no seeded website links to
    /// (it can still surface as a suggestion)
    pub fn add_technology(&self, technology: Technology) {
        self.technologies.lock().unwrap().push(technology);
    }

    /// Configure to fail on next operation
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned (should only happen if
    /// another thread panicked while holding the lock)
    pub fn fail_next(&self, message: &str) {
        *self.should_fail_next.lock().unwrap() = true;
        *self.error_message.lock().unwrap() = message.to_string();
    }

    /// Check if should fail and reset
    fn check_fail(&self) -> DatabaseResult<()> {
        let should_fail = *self.should_fail_next.lock().unwrap();
        if should_fail {
            *self.should_fail_next.lock().unwrap() = false;
            let message = self.error_message.lock().unwrap().clone();
            return Err(DatabaseError::UnexpectedState {
                operation: Box::new(DatabaseOperation::Query {
                    description: "mock operation".to_string(),
                }),
                message,
                correlation_id: None,
            });
        }
        Ok(())
    }

    /// Filter, sort, and slice like the SQL queries do
    fn select<F>(
        &self,
        predicate: F,
        filters: &MetadataFilters,
        sort: Sort,
        page: Page,
    ) -> (Vec<Website>, i64)
    where
        F: Fn(&Website) -> bool,
    {
        let websites = self.websites.lock().unwrap();
        let mut matched: Vec<Website> = websites
            .iter()
            .filter(|w| predicate(w) && filters.matches(&w.metadata))
            .cloned()
            .collect();
        sort_websites(&mut matched, sort);
        let total = matched.len() as i64;

        let start = usize::try_from(page.offset()).unwrap_or(usize::MAX);
        let rows: Vec<Website> = matched
            .into_iter()
            .skip(start)
            .take(usize::try_from(page.size).unwrap_or(0))
            .collect();
        (rows, total)
    }
}

fn sort_websites(websites: &mut [Website], sort: Sort) {
    websites.sort_by(|a, b| {
        let ordering = match sort.field {
            SortField::Url => a.domain.cmp(&b.domain),
            SortField::LastScraped => a.last_scraped.cmp(&b.last_scraped),
            SortField::LoadTime => {
                let left = a.metadata.page_load_time;
                let right = b.metadata.page_load_time;
                left.partial_cmp(&right).unwrap_or(Ordering::Equal)
            }
        };
        match sort.order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });
}

#[async_trait]
impl WebsiteRepository for MockWebsiteRepository {
    async fn find_websites_by_domain(
        &self,
        pattern: &DomainPattern,
        filters: &MetadataFilters,
        sort: Sort,
        page: Page,
    ) -> DatabaseResult<(Vec<Website>, i64)> {
        self.check_fail()?;
        Ok(self.select(|w| pattern.matches(&w.domain), filters, sort, page))
    }

    async fn find_websites_by_technology(
        &self,
        pattern: &str,
        count_mode: TechnologyCountMode,
        filters: &MetadataFilters,
        sort: Sort,
        page: Page,
    ) -> DatabaseResult<(Vec<Website>, i64)> {
        self.check_fail()?;

        let needle = pattern.to_lowercase();
        let (rows, substring_total) = self.select(
            |w| {
                w.technologies
                    .iter()
                    .any(|t| t.name.to_lowercase().contains(&needle))
            },
            filters,
            sort,
            page,
        );

        let total = match count_mode {
            TechnologyCountMode::Substring => substring_total,
            TechnologyCountMode::ExactName => {
                let websites = self.websites.lock().unwrap();
                websites
                    .iter()
                    .filter(|w| {
                        filters.matches(&w.metadata)
                            && w.technologies
                                .iter()
                                .any(|t| t.name.to_lowercase() == needle)
                    })
                    .count() as i64
            }
        };

        Ok((rows, total))
    }

    async fn find_websites_by_category(
        &self,
        category: &str,
        filters: &MetadataFilters,
        sort: Sort,
        page: Page,
    ) -> DatabaseResult<(Vec<Website>, i64)> {
        self.check_fail()?;
        Ok(self.select(
            |w| w.technologies.iter().any(|t| t.category == category),
            filters,
            sort,
            page,
        ))
    }

    async fn find_websites_default(
        &self,
        filters: &MetadataFilters,
        sort: Sort,
        page: Page,
    ) -> DatabaseResult<(Vec<Website>, i64)> {
        self.check_fail()?;
        Ok(self.select(|_| true, filters, sort, page))
    }

    async fn find_technologies_by_name(
        &self,
        pattern: &str,
        limit: i64,
    ) -> DatabaseResult<Vec<Technology>> {
        self.check_fail()?;

        let needle = pattern.to_lowercase();
        let technologies = self.technologies.lock().unwrap();
        Ok(technologies
            .iter()
            .filter(|t| t.name.to_lowercase().contains(&needle))
            .take(usize::try_from(limit).unwrap_or(0))
            .cloned()
            .collect())
    }

    async fn dataset_stats(&self) -> DatabaseResult<DatasetStats> {
        self.check_fail()?;

        let websites = self.websites.lock().unwrap();
        let technologies = self.technologies.lock().unwrap();
        let links: usize = websites.iter().map(|w| w.technologies.len()).sum();
        Ok(DatasetStats {
            websites: websites.len() as i64,
            technologies: technologies.len() as i64,
            links: links as i64,
            last_scraped: websites.iter().map(|w| w.last_scraped).max(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn website(domain: &str, techs: &[(&str, &str)], scraped_hour: u32) -> Website {
        Website {
            id: Uuid::new_v4(),
            domain: domain.to_string(),
            last_scraped: Utc.with_ymd_and_hms(2026, 3, 1, scraped_hour, 0, 0).unwrap(),
            metadata: crate::models::WebsiteMetadata::default(),
            technologies: techs
                .iter()
                .map(|(name, category)| Technology {
                    id: Uuid::new_v4(),
                    name: (*name).to_string(),
                    category: (*category).to_string(),
                })
                .collect(),
        }
    }

    #[tokio::test]
    async fn exact_count_mode_is_narrower_than_substring_rows() {
        let mock = MockWebsiteRepository::with_websites(vec![
            website("a.com", &[("React", "JavaScript frameworks")], 1),
            website("b.com", &[("React", "JavaScript frameworks")], 2),
            website("c.com", &[("React Native", "Mobile frameworks")], 3),
        ]);

        let (rows, total) = mock
            .find_websites_by_technology(
                "React",
                TechnologyCountMode::ExactName,
                &MetadataFilters::default(),
                Sort::default(),
                Page::first(20),
            )
            .await
            .unwrap();

        assert_eq!(rows.len(), 3, "rows use substring matching");
        assert_eq!(total, 2, "count uses exact name matching");
    }

    #[tokio::test]
    async fn fail_next_surfaces_one_error_then_recovers() {
        let mock = MockWebsiteRepository::new();
        mock.fail_next("store went away");

        let err = mock
            .find_websites_default(&MetadataFilters::default(), Sort::default(), Page::first(10))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("store went away"));

        assert!(
            mock.find_websites_default(&MetadataFilters::default(), Sort::default(), Page::first(10))
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn default_sort_is_most_recently_scraped_first() {
        let mock = MockWebsiteRepository::with_websites(vec![
            website("old.com", &[], 1),
            website("new.com", &[], 9),
            website("mid.com", &[], 5),
        ]);

        let (rows, _) = mock
            .find_websites_default(&MetadataFilters::default(), Sort::default(), Page::first(10))
            .await
            .unwrap();
        let domains: Vec<&str> = rows.iter().map(|w| w.domain.as_str()).collect();
        assert_eq!(domains, vec!["new.com", "mid.com", "old.com"]);
    }
}
