//! Deterministic merge of concurrently fetched strategy results
//!
//! The fetches run in parallel into independent buffers; this module is the
//! strictly sequential pass that follows. Merge logic never lives inside the
//! fetch futures themselves, which keeps the ordering guarantee trivially
//! testable.

use std::collections::HashSet;

use stacklens_store::Website;
use uuid::Uuid;

/// Which retrieval strategy produced a candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchSource {
    Domain,
    Technology,
    Category,
    Default,
}

/// A website plus the provenance of its match
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub website: Website,
    pub source: MatchSource,
}

impl Candidate {
    /// Tag a whole page of single-strategy rows with their provenance
    pub fn tag_all(websites: Vec<Website>, source: MatchSource) -> Vec<Self> {
        websites
            .into_iter()
            .map(|website| Self { website, source })
            .collect()
    }
}

/// Merge the combined plan's two buffers into one page.
///
/// Domain matches always precede technology-only matches regardless of
/// recency or which fetch finished first. Deduplication keys on website
/// identity, not the domain string. Technology rows backfill until the page
/// is full.
pub fn merge_combined(
    domain_rows: Vec<Website>,
    technology_rows: Vec<Website>,
    limit: usize,
) -> Vec<Candidate> {
    let mut seen: HashSet<Uuid> = HashSet::new();
    let mut merged: Vec<Candidate> = Vec::new();

    for website in domain_rows {
        if merged.len() >= limit {
            break;
        }
        if seen.insert(website.id) {
            merged.push(Candidate {
                website,
                source: MatchSource::Domain,
            });
        }
    }

    for website in technology_rows {
        if merged.len() >= limit {
            break;
        }
        if seen.insert(website.id) {
            merged.push(Candidate {
                website,
                source: MatchSource::Technology,
            });
        }
    }

    merged
}
