//! Product search module / 商品搜索模块
//!
//! Two phases per request / 每次请求分两个阶段：
//! - Exact phase: case-insensitive substring filter executed by the record store
//! - Fuzzy phase: when the exact phase is empty, scan every record with the
//!   requested status and rank it by Levenshtein distance
//!
//! Call direction: API → SearchEngine → RecordStore (unidirectional).
//! Nothing here holds state between requests.

pub mod distance;
pub mod engine;
pub mod error;
pub mod schema;
pub mod scorer;

pub use distance::distance;
pub use engine::{rank, SearchEngine, DEFAULT_FUZZY_LIMIT};
pub use error::SearchError;
pub use schema::{MatchPhase, ScoredCandidate, SearchQuery, SearchResult, DEFAULT_STATUS};
pub use scorer::{contains_query, max_distance, score};

/// A record that can be matched against a search query.
///
/// The four fields are, in order: name, brand, model identifier and
/// description.
pub trait Candidate {
    fn search_fields(&self) -> [&str; 4];
}
