//! End-to-end bulk upload: load -> normalize -> commit, with the uploaded
//! file removed on every exit path.

use std::sync::Arc;

use kirana_core::{CatalogEntryDraft, StoreProfiles, StoreType, UploadSummary};
use kirana_db::{CatalogWriter, DbError};
use serde::Serialize;
use tempfile::TempPath;
use thiserror::Error;

use crate::batch::{process_rows, BatchOutcome};
use crate::commit::commit_drafts;
use crate::error::IngestError;
use crate::sheet::load_rows;

/// Drafts included in a preview response.
pub const PREVIEW_DRAFT_LIMIT: usize = 20;

/// One upload handed over by the HTTP layer or CLI.
///
/// `file` is owned by the pipeline and deleted when processing ends. The
/// store and vendor ids are trusted as given.
#[derive(Debug)]
pub struct UploadRequest {
    pub file: TempPath,
    pub store_type: StoreType,
    pub store_id: i64,
    pub vendor_id: i64,
}

#[derive(Debug, Error)]
pub enum UploadError {
    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error("failed to commit catalog entries: {0}")]
    Commit(#[from] DbError),
}

/// Dry-run result: the summary a real upload would produce, minus the writes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadPreview {
    #[serde(flatten)]
    pub summary: UploadSummary,
    /// Rows that would be inserted.
    pub valid_count: usize,
    /// The first [`PREVIEW_DRAFT_LIMIT`] valid drafts.
    pub drafts: Vec<CatalogEntryDraft>,
}

/// Runs a bulk upload against `writer`.
///
/// Structural problems (unreadable or empty sheet) abort before any row is
/// processed. Row problems never do.
///
/// # Errors
///
/// Returns [`UploadError::Ingest`] for sheet failures and
/// [`UploadError::Commit`] if persistence fails.
pub async fn run_bulk_upload<W: CatalogWriter>(
    writer: &W,
    profiles: Arc<StoreProfiles>,
    request: UploadRequest,
) -> Result<UploadSummary, UploadError> {
    let store_id = request.store_id;
    let (file, processed) = load_and_process(profiles, request).await;

    let result = match processed {
        Ok(outcome) => match commit_drafts(writer, store_id, &outcome.drafts).await {
            Ok(uploaded) => {
                tracing::info!(
                    store_id,
                    uploaded,
                    skipped = outcome.skipped_count,
                    "bulk upload committed"
                );
                Ok(outcome.into_summary(uploaded))
            }
            Err(e) => Err(UploadError::Commit(e)),
        },
        Err(e) => Err(UploadError::Ingest(e)),
    };

    remove_upload(file);
    result
}

/// Loads and normalizes an upload without writing anything.
///
/// # Errors
///
/// Returns [`IngestError`] for unreadable or empty sheets.
pub async fn preview_bulk_upload(
    profiles: Arc<StoreProfiles>,
    request: UploadRequest,
) -> Result<UploadPreview, IngestError> {
    let (file, processed) = load_and_process(profiles, request).await;

    let result = processed.map(|mut outcome| {
        let valid_count = outcome.drafts.len();
        let drafts: Vec<CatalogEntryDraft> =
            outcome.drafts.drain(..).take(PREVIEW_DRAFT_LIMIT).collect();

        let mut summary = outcome.into_summary(0);
        summary.message = format!(
            "{valid_count} of {} rows are valid and would be uploaded",
            summary.total_rows
        );
        UploadPreview {
            summary,
            valid_count,
            drafts,
        }
    });

    remove_upload(file);
    result
}

/// Parses and normalizes the sheet on the blocking pool.
///
/// The file comes back with the result so the caller removes it only after
/// the rows are committed. If the blocking task dies the file is dropped with
/// it and `TempPath` deletes it.
async fn load_and_process(
    profiles: Arc<StoreProfiles>,
    request: UploadRequest,
) -> (Option<TempPath>, Result<BatchOutcome, IngestError>) {
    let UploadRequest {
        file,
        store_type,
        store_id,
        vendor_id,
    } = request;

    let task = tokio::task::spawn_blocking(move || {
        let processed = load_rows(&file).map(|rows| {
            tracing::info!(
                store_id,
                store_type = %store_type,
                rows = rows.len(),
                "processing bulk upload"
            );
            process_rows(&rows, store_type, &profiles, store_id, vendor_id)
        });
        (file, processed)
    });

    match task.await {
        Ok((file, processed)) => (Some(file), processed),
        Err(e) => (None, Err(IngestError::Interrupted(e))),
    }
}

/// Deletes the spooled upload. `TempPath`'s drop guard covers early returns
/// and unwinding; this is the normal path, where a failure is worth logging.
fn remove_upload(file: Option<TempPath>) {
    let Some(file) = file else { return };
    let path = file.to_path_buf();
    if let Err(e) = file.close() {
        tracing::warn!(path = %path.display(), error = %e, "failed to remove uploaded file");
    }
}
