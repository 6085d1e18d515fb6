use thiserror::Error;

/// Structural failures that stop an upload before any row is processed.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("uploaded file contains no data rows")]
    EmptyFile,

    #[error("uploaded file is not a readable spreadsheet: {reason}")]
    UnreadableFile { reason: String },

    #[error("sheet processing was interrupted: {0}")]
    Interrupted(#[from] tokio::task::JoinError),

    #[error("failed to build template workbook: {0}")]
    Template(#[from] rust_xlsxwriter::XlsxError),
}

impl IngestError {
    pub(crate) fn unreadable(reason: impl std::fmt::Display) -> Self {
        IngestError::UnreadableFile {
            reason: reason.to_string(),
        }
    }
}
