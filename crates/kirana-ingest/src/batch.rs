//! Batch Processor: rows -> drafts, skip count, per-row error detail.

use std::panic::{catch_unwind, AssertUnwindSafe};

use kirana_core::{
    CatalogEntryDraft, RowError, StoreProfiles, StoreType, UploadSummary, MAX_REPORTED_ERRORS,
};

use crate::normalize::{normalize_row, RowRejection};
use crate::row::RawRow;

/// Spreadsheet row number of data row `index`: 1-based, plus the header row.
#[must_use]
pub fn sheet_row_number(index: usize) -> usize {
    index + 2
}

/// Result of normalizing every row of one upload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchOutcome {
    /// Valid drafts, in input row order.
    pub drafts: Vec<CatalogEntryDraft>,
    /// Blank, rejected and failed rows.
    pub skipped_count: usize,
    pub total_rows: usize,
    /// Rejected and failed rows; at most [`MAX_REPORTED_ERRORS`] are kept.
    pub errors: Vec<RowError>,
}

impl BatchOutcome {
    /// Summary for a commit that persisted `uploaded_count` of the drafts.
    #[must_use]
    pub fn into_summary(self, uploaded_count: u64) -> UploadSummary {
        UploadSummary::new(
            uploaded_count,
            self.skipped_count,
            self.total_rows,
            self.errors,
        )
    }

    fn record_error(&mut self, index: usize, error: String) {
        self.skipped_count += 1;
        if self.errors.len() < MAX_REPORTED_ERRORS {
            self.errors.push(RowError {
                row: sheet_row_number(index),
                error,
            });
        }
    }
}

/// Normalizes `rows` with the profile for `store_type`.
#[must_use]
pub fn process_rows(
    rows: &[RawRow],
    store_type: StoreType,
    profiles: &StoreProfiles,
    store_id: i64,
    vendor_id: i64,
) -> BatchOutcome {
    let profile = profiles.for_type(store_type);
    process_rows_with(rows, |row| normalize_row(profile, row, store_id, vendor_id))
}

/// Runs `normalize` over every row inside a per-row failure boundary.
///
/// Blank rows count as skipped without an error entry. A rejection or a panic
/// counts as skipped and is reported with its sheet row number; sibling rows
/// are unaffected.
pub(crate) fn process_rows_with<F>(rows: &[RawRow], normalize: F) -> BatchOutcome
where
    F: Fn(&RawRow) -> Result<CatalogEntryDraft, RowRejection>,
{
    let mut outcome = BatchOutcome {
        total_rows: rows.len(),
        ..BatchOutcome::default()
    };

    for (index, row) in rows.iter().enumerate() {
        if row.is_blank() {
            outcome.skipped_count += 1;
            continue;
        }

        match catch_unwind(AssertUnwindSafe(|| normalize(row))) {
            Ok(Ok(draft)) => outcome.drafts.push(draft),
            Ok(Err(rejection)) => {
                tracing::debug!(row = sheet_row_number(index), reason = %rejection, "row skipped");
                outcome.record_error(index, rejection.to_string());
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                tracing::error!(
                    row = sheet_row_number(index),
                    error = %message,
                    "row normalization failed"
                );
                outcome.record_error(index, format!("failed to process row: {message}"));
            }
        }
    }

    outcome
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unexpected error".to_string()
    }
}
