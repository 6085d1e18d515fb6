//! Persistence Committer.

use kirana_core::CatalogEntryDraft;
use kirana_db::{CatalogWriter, DbError};

/// Commits `drafts` and bumps the store's product counter by the number that
/// actually landed, atomically.
///
/// Rows the store rejects (duplicate SKUs, values it cannot hold) are skipped
/// by the writer; the counter is never incremented by the attempted count.
///
/// # Errors
///
/// Returns [`DbError`] if the commit fails as a whole; nothing is persisted
/// in that case.
pub async fn commit_drafts<W: CatalogWriter>(
    writer: &W,
    store_id: i64,
    drafts: &[CatalogEntryDraft],
) -> Result<u64, DbError> {
    if drafts.is_empty() {
        return Ok(0);
    }

    let inserted = writer.commit_entries(store_id, drafts).await?;
    let attempted = drafts.len();
    if usize::try_from(inserted).map_or(true, |n| n < attempted) {
        tracing::warn!(
            store_id,
            attempted,
            inserted,
            "bulk insert persisted fewer entries than attempted"
        );
    }

    Ok(inserted)
}
