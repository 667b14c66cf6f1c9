//! Search request/result types / 搜索请求与结果类型

use serde::Serialize;

/// Status used when the caller does not name one / 默认状态
pub const DEFAULT_STATUS: &str = "stock";

/// Search input / 搜索输入
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    text: String,
    status: String,
}

impl SearchQuery {
    /// Empty `status` falls back to [`DEFAULT_STATUS`]. `text` is kept as
    /// given; an empty text lists every record with the status.
    pub fn new(text: impl Into<String>, status: impl Into<String>) -> Self {
        let status = status.into();
        Self {
            text: text.into(),
            status: if status.is_empty() {
                DEFAULT_STATUS.to_string()
            } else {
                status
            },
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn status(&self) -> &str {
        &self.status
    }
}

/// Which phase produced the records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchPhase {
    Exact,
    Fuzzy,
}

/// A candidate together with its edit-distance score.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCandidate<C> {
    pub candidate: C,
    pub score: usize,
}

/// Ordered search output / 有序的搜索结果
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult<C> {
    pub records: Vec<C>,
    pub phase: MatchPhase,
}

impl<C> SearchResult<C> {
    pub fn count(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
