//! Bulk upload and dry-run preview handlers.
//!
//! The multipart `file` field is spooled to a temp file carrying the upload's
//! extension; the ingest pipeline takes ownership of that file and removes it
//! on every exit path.

use std::{path::Path, sync::Arc};

use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    Extension, Json,
};
use kirana_core::{StoreType, UploadSummary};
use kirana_ingest::{
    IngestError, UploadError, UploadPreview, UploadRequest, SUPPORTED_EXTENSIONS,
};
use tempfile::TempPath;
use tokio::io::AsyncWriteExt;

use crate::middleware::{RequestId, VendorId};

use super::{map_db_error, ApiError, AppState};

/// MIME types browsers and HTTP clients send for spreadsheet uploads.
const ALLOWED_CONTENT_TYPES: &[&str] = &[
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    "application/vnd.ms-excel",
    "application/vnd.ms-excel.sheet.macroenabled.12",
    "application/vnd.ms-excel.sheet.binary.macroenabled.12",
    "application/vnd.oasis.opendocument.spreadsheet",
    "text/csv",
    "application/csv",
    "text/plain",
    "application/octet-stream",
];

/// A multipart upload after spooling.
struct SpooledUpload {
    file: TempPath,
    declared_store_type: Option<String>,
}

pub(super) async fn bulk_upload(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(VendorId(vendor_id)): Extension<VendorId>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<UploadSummary>), ApiError> {
    let (request, store_name) = prepare(&state, &req_id, vendor_id, multipart).await?;
    let store_id = request.store_id;

    let summary = kirana_ingest::run_bulk_upload(&state.pool, Arc::clone(&state.profiles), request)
        .await
        .map_err(|e| map_upload_error(req_id.0.clone(), e))?;

    tracing::info!(
        store_id,
        store = %store_name,
        vendor_id,
        uploaded = summary.uploaded_count,
        skipped = summary.skipped_count,
        "bulk upload finished"
    );
    Ok((StatusCode::CREATED, Json(summary)))
}

pub(super) async fn preview_upload(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(VendorId(vendor_id)): Extension<VendorId>,
    multipart: Multipart,
) -> Result<Json<UploadPreview>, ApiError> {
    let (request, _) = prepare(&state, &req_id, vendor_id, multipart).await?;

    let preview = kirana_ingest::preview_bulk_upload(Arc::clone(&state.profiles), request)
        .await
        .map_err(|e| map_ingest_error(req_id.0.clone(), &e))?;
    Ok(Json(preview))
}

/// Resolves the vendor's store and spools the upload into an [`UploadRequest`].
async fn prepare(
    state: &AppState,
    req_id: &RequestId,
    vendor_id: i64,
    multipart: Multipart,
) -> Result<(UploadRequest, String), ApiError> {
    let store = kirana_db::get_store_for_vendor(&state.pool, vendor_id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?
        .ok_or_else(|| ApiError::new(req_id.0.clone(), "not_found", "store not found"))?;

    let upload = read_upload(multipart, &state.upload_dir, &req_id.0).await?;

    let store_type = upload
        .declared_store_type
        .as_deref()
        .map_or_else(|| store.store_type(), StoreType::from_declared);

    Ok((
        UploadRequest {
            file: upload.file,
            store_type,
            store_id: store.id,
            vendor_id,
        },
        store.name,
    ))
}

async fn read_upload(
    mut multipart: Multipart,
    upload_dir: &Path,
    request_id: &str,
) -> Result<SpooledUpload, ApiError> {
    let mut file: Option<TempPath> = None;
    let mut declared_store_type: Option<String> = None;

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| map_multipart_error(request_id, &e))?
    {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("file") => {
                let extension = validate_file_field(
                    field.file_name(),
                    field.content_type(),
                    request_id,
                )?;
                let named = tempfile::Builder::new()
                    .prefix("upload-")
                    .suffix(&format!(".{extension}"))
                    .tempfile_in(upload_dir)
                    .map_err(|e| {
                        tracing::error!(error = %e, "failed to create upload file");
                        ApiError::new(request_id, "internal_error", "failed to store upload")
                    })?;
                let (std_file, path) = named.into_parts();
                let mut out = tokio::fs::File::from_std(std_file);

                // `path` deletes the partial file if anything below fails.
                while let Some(chunk) = field
                    .chunk()
                    .await
                    .map_err(|e| map_multipart_error(request_id, &e))?
                {
                    out.write_all(&chunk).await.map_err(|e| {
                        tracing::error!(error = %e, "failed to write upload chunk");
                        ApiError::new(request_id, "internal_error", "failed to store upload")
                    })?;
                }
                out.flush().await.map_err(|e| {
                    tracing::error!(error = %e, "failed to flush upload");
                    ApiError::new(request_id, "internal_error", "failed to store upload")
                })?;

                file = Some(path);
            }
            Some("storeType") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| map_multipart_error(request_id, &e))?;
                if !text.trim().is_empty() {
                    declared_store_type = Some(text);
                }
            }
            _ => {}
        }
    }

    let file = file.ok_or_else(|| ApiError::new(request_id, "bad_request", "no file uploaded"))?;
    Ok(SpooledUpload {
        file,
        declared_store_type,
    })
}

/// Checks the allow-lists and returns the lowercase extension to spool with.
fn validate_file_field(
    file_name: Option<&str>,
    content_type: Option<&str>,
    request_id: &str,
) -> Result<String, ApiError> {
    let extension = file_name
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .map(str::to_lowercase)
        .filter(|ext| SUPPORTED_EXTENSIONS.contains(&ext.as_str()))
        .ok_or_else(|| {
            ApiError::new(
                request_id,
                "bad_request",
                "only Excel (.xlsx, .xls) or CSV files are allowed",
            )
        })?;

    if let Some(content_type) = content_type {
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_lowercase();
        if !ALLOWED_CONTENT_TYPES.contains(&essence.as_str()) {
            return Err(ApiError::new(
                request_id,
                "bad_request",
                format!("unsupported content type {essence}"),
            ));
        }
    }

    Ok(extension)
}

fn map_multipart_error(request_id: &str, error: &MultipartError) -> ApiError {
    if error.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::new(request_id, "payload_too_large", "uploaded file is too large")
    } else {
        ApiError::new(request_id, "bad_request", error.body_text())
    }
}

fn map_ingest_error(request_id: String, error: &IngestError) -> ApiError {
    match error {
        IngestError::EmptyFile | IngestError::UnreadableFile { .. } => {
            ApiError::new(request_id, "invalid_file", error.to_string())
        }
        IngestError::Interrupted(_) | IngestError::Template(_) => {
            tracing::error!(error = %error, "unexpected ingest failure");
            ApiError::new(request_id, "internal_error", "failed to process upload")
        }
    }
}

fn map_upload_error(request_id: String, error: UploadError) -> ApiError {
    match error {
        UploadError::Ingest(e) => map_ingest_error(request_id, &e),
        UploadError::Commit(e) => {
            tracing::error!(error = %e, "bulk upload commit failed");
            ApiError::new(request_id, "internal_error", "failed to save products")
        }
    }
}
