//! Spreadsheet ingestion for vendor catalogs: sheet loading, field
//! extraction, per-store-type normalization, batching, commit, and upload
//! templates.

pub mod batch;
pub mod coerce;
pub mod commit;
pub mod error;
pub mod extract;
pub mod food_type;
pub mod normalize;
pub mod pipeline;
pub mod row;
pub mod sheet;
pub mod template;

pub use batch::{process_rows, BatchOutcome};
pub use commit::commit_drafts;
pub use error::IngestError;
pub use normalize::{normalize_row, RowRejection};
pub use pipeline::{
    preview_bulk_upload, run_bulk_upload, UploadError, UploadPreview, UploadRequest,
};
pub use row::{CellValue, RawRow};
pub use sheet::{load_rows, SUPPORTED_EXTENSIONS};
pub use template::{generate_template, XLSX_CONTENT_TYPE};
