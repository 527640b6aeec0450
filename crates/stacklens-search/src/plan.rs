//! Query classification and retrieval planning
//!
//! The classifier inspects the raw request and decides which retrieval
//! strategies run. Precedence: an explicit category always wins, then an
//! explicit technology name, then the free-text query (which fans out to
//! BOTH the domain and technology strategies), and finally the default
//! most-recently-scraped listing when nothing was provided. No input shape
//! is an error; blank input degrades to the default plan.

use stacklens_store::DomainPattern;

/// TLDs appended to a bare query when probing for an exact domain match,
/// tried in this fixed order
pub const COMMON_TLDS: &[&str] = &[".com", ".org", ".net", ".io", ".co", ".ai", ".app"];

/// Normalize a domain-ish string: trim, lowercase, strip scheme, strip
/// leading `www.`, strip trailing slashes.
///
/// Idempotent: normalizing an already-normalized domain is a no-op.
pub fn normalize_domain(raw: &str) -> String {
    let lowered = raw.trim().to_lowercase();
    // Take everything after the last scheme separator so repeated
    // normalization cannot peel another layer
    let mut domain = match lowered.rfind("://") {
        Some(idx) => lowered.get(idx.saturating_add(3)..).unwrap_or(""),
        None => &lowered,
    };
    domain = domain.trim_end_matches('/');
    while let Some(stripped) = domain.strip_prefix("www.") {
        domain = stripped;
    }
    domain.to_string()
}

/// Build the domain match terms for a cleaned query: the needle itself plus
/// every TLD-appended variant as exact candidates
pub fn domain_pattern(query: &str) -> DomainPattern {
    let needle = normalize_domain(query);
    let mut exact = Vec::with_capacity(COMMON_TLDS.len().saturating_add(1));
    exact.push(needle.clone());
    for tld in COMMON_TLDS {
        exact.push(format!("{needle}{tld}"));
    }
    DomainPattern { needle, exact }
}

/// Advisory URL-likeness: a dot, a slash, or a leading scheme.
///
/// Never gates which strategies run; only feeds suggestion eligibility
/// heuristics downstream.
pub fn is_url_like(query: &str) -> bool {
    query.contains('.')
        || query.contains('/')
        || query.starts_with("http://")
        || query.starts_with("https://")
}

/// The retrieval strategies selected for one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetrievalPlan {
    /// Explicit category filter; `query`/`tech` are ignored
    Category { category: String },
    /// Explicit technology name: exact-preferred count, substring rows
    Technology { pattern: String },
    /// Free-text query: domain and technology strategies run concurrently
    Combined {
        query: String,
        pattern: DomainPattern,
        url_like: bool,
    },
    /// No usable input: most recently scraped websites, unfiltered
    Default,
}

impl RetrievalPlan {
    /// Classify raw request inputs into a plan
    pub fn classify(query: Option<&str>, tech: Option<&str>, category: Option<&str>) -> Self {
        fn non_empty(value: Option<&str>) -> Option<&str> {
            value.map(str::trim).filter(|v| !v.is_empty())
        }

        if let Some(category) = non_empty(category) {
            return Self::Category {
                category: category.to_string(),
            };
        }
        if let Some(tech) = non_empty(tech) {
            return Self::Technology {
                pattern: tech.to_string(),
            };
        }
        if let Some(query) = non_empty(query) {
            let cleaned = query.to_lowercase();
            return Self::Combined {
                pattern: domain_pattern(&cleaned),
                url_like: is_url_like(&cleaned),
                query: cleaned,
            };
        }
        Self::Default
    }

    /// Plans eligible for "did you mean" suggestions when results are empty
    pub const fn is_query_driven(&self) -> bool {
        matches!(self, Self::Technology { .. } | Self::Combined { .. })
    }

    /// The text a suggestion lookup should match against technology names
    pub fn suggestion_needle(&self) -> Option<&str> {
        match self {
            Self::Technology { pattern } => Some(pattern),
            Self::Combined { query, .. } => Some(query),
            Self::Category { .. } | Self::Default => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalization_strips_scheme_www_and_trailing_slash() {
        assert_eq!(normalize_domain("HTTPS://www.Shopify.com/"), "shopify.com");
        assert_eq!(normalize_domain("  example.org  "), "example.org");
        assert_eq!(normalize_domain("www.www.nested.io"), "nested.io");
    }

    #[test]
    fn normalization_is_idempotent() {
        for raw in [
            "https://www.Shopify.com/",
            "www.www.example.com",
            "http://a.b/c/",
            "weird://scheme://tail",
            "plain",
            "",
        ] {
            let once = normalize_domain(raw);
            assert_eq!(normalize_domain(&once), once, "input: {raw}");
        }
    }

    #[test]
    fn pattern_carries_needle_and_tld_variants_in_order() {
        let pattern = domain_pattern("shopify");
        assert_eq!(pattern.needle, "shopify");
        assert_eq!(
            pattern.exact,
            vec![
                "shopify",
                "shopify.com",
                "shopify.org",
                "shopify.net",
                "shopify.io",
                "shopify.co",
                "shopify.ai",
                "shopify.app",
            ]
        );
    }

    #[test]
    fn category_beats_tech_beats_query() {
        let plan = RetrievalPlan::classify(Some("react"), Some("React"), Some("CDN"));
        assert_eq!(
            plan,
            RetrievalPlan::Category {
                category: "CDN".to_string()
            }
        );

        let plan = RetrievalPlan::classify(Some("react"), Some("React"), None);
        assert_eq!(
            plan,
            RetrievalPlan::Technology {
                pattern: "React".to_string()
            }
        );

        let plan = RetrievalPlan::classify(Some("react"), None, None);
        assert!(matches!(plan, RetrievalPlan::Combined { .. }));
    }

    #[test]
    fn blank_input_degrades_to_default() {
        assert_eq!(
            RetrievalPlan::classify(Some("   "), Some(""), None),
            RetrievalPlan::Default
        );
        assert_eq!(RetrievalPlan::classify(None, None, None), RetrievalPlan::Default);
    }

    #[test]
    fn url_likeness_is_advisory_only() {
        // Both URL-like and plain queries produce the same Combined plan shape
        let url_like = RetrievalPlan::classify(Some("shopify.com"), None, None);
        let plain = RetrievalPlan::classify(Some("shopify"), None, None);
        match (url_like, plain) {
            (
                RetrievalPlan::Combined { url_like: a, .. },
                RetrievalPlan::Combined { url_like: b, .. },
            ) => {
                assert!(a);
                assert!(!b);
            }
            other => panic!("expected combined plans, got {other:?}"),
        }
    }

    #[test]
    fn combined_query_is_trimmed_and_lowercased() {
        let plan = RetrievalPlan::classify(Some("  ReAct  "), None, None);
        match plan {
            RetrievalPlan::Combined { query, .. } => assert_eq!(query, "react"),
            other => panic!("expected combined plan, got {other:?}"),
        }
    }
}
