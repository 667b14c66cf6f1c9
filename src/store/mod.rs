//! Record store boundary / 记录存储边界
//!
//! The search engine only talks to this trait. `SqliteStore` is the
//! production implementation.

use async_trait::async_trait;

use crate::models::StatusId;
use crate::search::Candidate;

pub mod sqlite;

pub use sqlite::SqliteStore;

/// Read-only queries the search engine needs.
#[async_trait]
pub trait RecordStore: Send + Sync {
    type Record: Candidate + Send + Sync;

    /// Look a status up by its exact name.
    async fn resolve_status(&self, name: &str) -> anyhow::Result<Option<StatusId>>;

    /// Records with `status` whose name, brand, model or description contains
    /// `text`, ignoring case.
    async fn find_by_text_and_status(&self, text: &str, status: StatusId) -> anyhow::Result<Vec<Self::Record>>;

    /// Every record with `status`, in store order.
    async fn find_by_status(&self, status: StatusId) -> anyhow::Result<Vec<Self::Record>>;
}
