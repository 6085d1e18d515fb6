//! The persistence seam the bulk-upload committer is generic over.

use std::future::Future;

use kirana_core::CatalogEntryDraft;
use sqlx::PgPool;

use crate::DbError;

/// Commits catalog entries together with the store aggregate they affect.
///
/// Implemented for [`PgPool`]; tests substitute an in-memory writer to
/// simulate partial inserts and failures.
pub trait CatalogWriter: Sync {
    /// Inserts drafts, skipping rows the store rejects, adds the number
    /// persisted to the store's `total_products`, and returns that number.
    ///
    /// Either both the rows and the counter update are committed, or neither.
    fn commit_entries(
        &self,
        store_id: i64,
        drafts: &[CatalogEntryDraft],
    ) -> impl Future<Output = Result<u64, DbError>> + Send;
}

impl CatalogWriter for PgPool {
    fn commit_entries(
        &self,
        store_id: i64,
        drafts: &[CatalogEntryDraft],
    ) -> impl Future<Output = Result<u64, DbError>> + Send {
        crate::catalog_entries::commit_catalog_entries(self, store_id, drafts)
    }
}
