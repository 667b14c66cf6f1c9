//! Search orchestrator / 搜索编排
//!
//! Exact phase first; the fuzzy phase only runs when the exact phase found
//! nothing for a non-empty query.

use super::error::SearchError;
use super::schema::{MatchPhase, ScoredCandidate, SearchQuery, SearchResult};
use super::scorer::{max_distance, score};
use super::Candidate;
use crate::store::RecordStore;

/// Default cap on fuzzy matches / 模糊匹配默认上限
pub const DEFAULT_FUZZY_LIMIT: usize = 20;

/// Runs searches against a record store. Cheap to build per request.
pub struct SearchEngine<'a, S> {
    store: &'a S,
    fuzzy_limit: usize,
}

impl<'a, S: RecordStore> SearchEngine<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self {
            store,
            fuzzy_limit: DEFAULT_FUZZY_LIMIT,
        }
    }

    pub fn with_fuzzy_limit(mut self, limit: usize) -> Self {
        self.fuzzy_limit = limit;
        self
    }

    /// Search / 搜索
    pub async fn search(&self, query: &SearchQuery) -> Result<SearchResult<S::Record>, SearchError> {
        tracing::debug!("Search query: {:?}, status: {:?}", query.text(), query.status());

        let status_id = self
            .store
            .resolve_status(query.status())
            .await
            .map_err(SearchError::StoreUnavailable)?
            .ok_or_else(|| {
                tracing::debug!("Status not found: {}", query.status());
                SearchError::InvalidFilter(query.status().to_string())
            })?;

        let text = query.text();
        if text.is_empty() {
            let records = self
                .store
                .find_by_status(status_id)
                .await
                .map_err(SearchError::StoreUnavailable)?;
            return Ok(SearchResult {
                records,
                phase: MatchPhase::Exact,
            });
        }

        let records = self
            .store
            .find_by_text_and_status(text, status_id)
            .await
            .map_err(SearchError::StoreUnavailable)?;
        tracing::debug!("Exact phase found {} products", records.len());

        if !records.is_empty() {
            return Ok(SearchResult {
                records,
                phase: MatchPhase::Exact,
            });
        }

        tracing::debug!("No exact matches, falling back to fuzzy search");
        let candidates = self
            .store
            .find_by_status(status_id)
            .await
            .map_err(SearchError::StoreUnavailable)?;

        let ranked = rank(candidates, &text.to_lowercase(), self.fuzzy_limit);
        tracing::debug!("Fuzzy search kept {} matches", ranked.len());

        Ok(SearchResult {
            records: ranked.into_iter().map(|s| s.candidate).collect(),
            phase: MatchPhase::Fuzzy,
        })
    }
}

/// Score, filter by the adaptive threshold, sort ascending (stable) and
/// truncate to `limit`.
pub fn rank<C: Candidate>(candidates: Vec<C>, query_lower: &str, limit: usize) -> Vec<ScoredCandidate<C>> {
    let threshold = max_distance(query_lower);

    let mut scored: Vec<ScoredCandidate<C>> = candidates
        .into_iter()
        .filter_map(|candidate| {
            let score = score(&candidate, query_lower);
            (score <= threshold).then_some(ScoredCandidate { candidate, score })
        })
        .collect();

    // sort_by_key is stable: equal scores keep store order
    scored.sort_by_key(|s| s.score);
    scored.truncate(limit);
    scored
}
