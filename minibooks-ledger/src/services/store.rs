//! Ledger store collaborator: a thin typed repository over posting rows.

use crate::models::LedgerPosting;
use async_trait::async_trait;
use chrono::NaiveDate;
use minibooks_core::error::AppError;
use tokio::sync::RwLock;
use tracing::{info, instrument};
use uuid::Uuid;

/// Filter for ledger queries. Date bounds are inclusive calendar dates.
#[derive(Debug, Clone, Default)]
pub struct LedgerQuery {
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub gl_account: Option<String>,
}

/// Append-only posting store. `append_all` is atomic per call; no business
/// logic lives behind this trait.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Write a batch of postings. All rows land or none do.
    async fn append_all(&self, postings: &[LedgerPosting]) -> Result<(), AppError>;

    /// Delete every posting tagged with a source document id. Returns the
    /// number of rows removed; zero is not an error.
    async fn delete_by_source(&self, scope_id: Uuid, source_doc_id: &str)
        -> Result<u64, AppError>;

    /// Fetch postings matching the filter, ordered by date.
    async fn query(
        &self,
        scope_id: Uuid,
        filter: &LedgerQuery,
    ) -> Result<Vec<LedgerPosting>, AppError>;
}

/// In-memory ledger store.
#[derive(Default)]
pub struct MemoryLedgerStore {
    postings: RwLock<Vec<LedgerPosting>>,
}

impl MemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LedgerStore for MemoryLedgerStore {
    #[instrument(skip(self, postings), fields(count = postings.len()))]
    async fn append_all(&self, postings: &[LedgerPosting]) -> Result<(), AppError> {
        let mut rows = self.postings.write().await;
        rows.extend_from_slice(postings);
        info!(count = postings.len(), "Postings appended");
        Ok(())
    }

    #[instrument(skip(self), fields(scope_id = %scope_id, source_doc_id = %source_doc_id))]
    async fn delete_by_source(
        &self,
        scope_id: Uuid,
        source_doc_id: &str,
    ) -> Result<u64, AppError> {
        let mut rows = self.postings.write().await;
        let before = rows.len();
        rows.retain(|p| !(p.scope_id == scope_id && p.source_doc_id == source_doc_id));
        let removed = (before - rows.len()) as u64;
        info!(removed, "Postings deleted by source");
        Ok(removed)
    }

    #[instrument(skip(self, filter), fields(scope_id = %scope_id))]
    async fn query(
        &self,
        scope_id: Uuid,
        filter: &LedgerQuery,
    ) -> Result<Vec<LedgerPosting>, AppError> {
        let rows = self.postings.read().await;
        let mut matched: Vec<LedgerPosting> = rows
            .iter()
            .filter(|p| p.scope_id == scope_id)
            .filter(|p| filter.date_from.map_or(true, |from| p.date >= from))
            .filter(|p| filter.date_to.map_or(true, |to| p.date <= to))
            .filter(|p| {
                filter
                    .gl_account
                    .as_deref()
                    .map_or(true, |name| p.gl_account == name)
            })
            .cloned()
            .collect();
        matched.sort_by_key(|p| p.date);
        Ok(matched)
    }
}
