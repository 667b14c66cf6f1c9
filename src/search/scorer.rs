//! Candidate scoring / 候选评分

use super::distance::distance;
use super::Candidate;

/// Queries shorter than this (in chars) only tolerate a single edit.
const SHORT_QUERY_CHARS: usize = 5;

/// Best (lowest) edit distance between `query_lower` and any of the
/// candidate's fields, compared case-insensitively.
///
/// `query_lower` must already be lower-cased. Stops at the first exact match.
pub fn score<C: Candidate + ?Sized>(candidate: &C, query_lower: &str) -> usize {
    let mut best = usize::MAX;
    for field in candidate.search_fields() {
        let dist = distance(query_lower, &field.to_lowercase());
        if dist < best {
            best = dist;
        }
        if best == 0 {
            break;
        }
    }
    best
}

/// Exact-phase test: does any field contain `query_lower` once lower-cased?
///
/// Folds full Unicode case, so "RATÓN" finds "Ratón". Matching is literal.
pub fn contains_query<C: Candidate + ?Sized>(candidate: &C, query_lower: &str) -> bool {
    candidate
        .search_fields()
        .iter()
        .any(|field| field.to_lowercase().contains(query_lower))
}

/// Adaptive threshold for the fuzzy phase / 自适应阈值
pub fn max_distance(query_lower: &str) -> usize {
    if query_lower.chars().count() < SHORT_QUERY_CHARS {
        1
    } else {
        2
    }
}
