use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
    Extension,
};
use kirana_core::TemplateKind;
use kirana_ingest::{generate_template, XLSX_CONTENT_TYPE};

use crate::middleware::RequestId;

use super::{ApiError, AppState};

pub(super) async fn download_template(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(kind): Path<String>,
) -> Result<Response, ApiError> {
    let kind = TemplateKind::parse(&kind).ok_or_else(|| {
        ApiError::new(
            req_id.0.clone(),
            "validation_error",
            "template type must be one of general, grocery, medical, restaurant",
        )
    })?;

    let bytes = generate_template(kind, &state.profiles).map_err(|e| {
        tracing::error!(error = %e, kind = kind.as_str(), "template generation failed");
        ApiError::new(req_id.0.clone(), "internal_error", "failed to generate template")
    })?;

    let disposition = format!("attachment; filename={}", kind.file_name());
    Ok((
        [
            (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}
