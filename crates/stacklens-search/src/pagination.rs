//! Pagination math shared by every retrieval plan

use serde::Serialize;

/// Pagination block returned with every envelope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageInfo {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub total_pages: i64,
}

impl PageInfo {
    /// Compute the pagination block for a resolved total.
    ///
    /// `total_pages` is `ceil(total / limit)`, and 0 when there is nothing
    /// to page through. Out-of-range pages are not an error; the caller
    /// simply gets an empty row slice alongside accurate totals.
    pub fn new(page: i64, limit: i64, total: i64) -> Self {
        let limit = limit.max(1);
        let total = total.max(0);
        let total_pages = if total == 0 {
            0
        } else {
            (total as u64).div_ceil(limit as u64) as i64
        };
        Self {
            page: page.max(1),
            limit,
            total,
            total_pages,
        }
    }
}

/// Total for the combined (domain + technology) plan.
///
/// Deliberately `max(domain, technology)` rather than the overlap-corrected
/// sum: computing exact overlap would cost an extra full join per request,
/// and downstream pagination relies on this approximation staying
/// monotonic. Do not "fix" silently.
pub const fn combined_total(domain_total: i64, technology_total: i64) -> i64 {
    if domain_total >= technology_total {
        domain_total
    } else {
        technology_total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_pages_is_ceiling_division() {
        assert_eq!(PageInfo::new(1, 10, 15).total_pages, 2);
        assert_eq!(PageInfo::new(1, 10, 10).total_pages, 1);
        assert_eq!(PageInfo::new(1, 10, 1).total_pages, 1);
        assert_eq!(PageInfo::new(1, 20, 100).total_pages, 5);
    }

    #[test]
    fn zero_total_means_zero_pages() {
        let info = PageInfo::new(1, 20, 0);
        assert_eq!(info.total_pages, 0);
        assert_eq!(info.total, 0);
    }

    #[test]
    fn page_and_limit_are_clamped_to_one() {
        let info = PageInfo::new(0, 0, 5);
        assert_eq!(info.page, 1);
        assert_eq!(info.limit, 1);
    }

    #[test]
    fn combined_total_takes_the_larger_strategy() {
        assert_eq!(combined_total(7, 3), 7);
        assert_eq!(combined_total(2, 9), 9);
        assert_eq!(combined_total(4, 4), 4);
        assert_eq!(combined_total(0, 0), 0);
    }
}
