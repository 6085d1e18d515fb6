mod templates;
mod uploads;

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, State},
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use kirana_core::StoreProfiles;
use serde::Serialize;
use sqlx::PgPool;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{
    enforce_rate_limit, request_id, require_vendor_auth, AuthState, RateLimitState, RequestId,
};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub profiles: Arc<StoreProfiles>,
    /// Where multipart uploads are spooled before parsing.
    pub upload_dir: PathBuf,
    pub upload_max_bytes: usize,
}

/// Failure body: `{ "success": false, "error": ..., "code": ..., "requestId": ... }`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    pub success: bool,
    pub error: String,
    pub code: String,
    pub request_id: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    database: &'static str,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    success: bool,
    data: HealthData,
    request_id: String,
    timestamp: DateTime<Utc>,
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            success: false,
            error: message.into(),
            code: code.into(),
            request_id: request_id.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "unauthorized" => StatusCode::UNAUTHORIZED,
            "bad_request" | "validation_error" | "invalid_file" => StatusCode::BAD_REQUEST,
            "payload_too_large" => StatusCode::PAYLOAD_TOO_LARGE,
            "rate_limited" => StatusCode::TOO_MANY_REQUESTS,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

pub(super) fn map_db_error(request_id: String, error: &kirana_db::DbError) -> ApiError {
    tracing::error!(error = %error, "database query failed");
    ApiError::new(request_id, "internal_error", "database query failed")
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-request-id"),
            HeaderName::from_static("x-vendor-id"),
        ])
        .expose_headers([header::CONTENT_DISPOSITION])
}

fn vendor_router(
    auth: AuthState,
    rate_limit: RateLimitState,
    upload_max_bytes: usize,
) -> Router<AppState> {
    Router::new()
        .route(
            "/api/v1/vendor/products/bulk-upload",
            post(uploads::bulk_upload),
        )
        .route(
            "/api/v1/vendor/products/bulk-upload/preview",
            post(uploads::preview_upload),
        )
        .route(
            "/api/v1/vendor/products/template/{kind}",
            get(templates::download_template),
        )
        .layer(DefaultBodyLimit::max(upload_max_bytes))
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn_with_state(
                    rate_limit,
                    enforce_rate_limit,
                ))
                .layer(axum::middleware::from_fn_with_state(
                    auth,
                    require_vendor_auth,
                )),
        )
}

pub fn build_app(state: AppState, auth: AuthState, rate_limit: RateLimitState) -> Router {
    let public_routes = Router::new().route("/api/v1/health", get(health));
    let upload_max_bytes = state.upload_max_bytes;

    Router::new()
        .merge(public_routes)
        .merge(vendor_router(auth, rate_limit, upload_max_bytes))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let (status, data) = match kirana_db::health_check(&state.pool).await {
        Ok(()) => (
            StatusCode::OK,
            HealthData {
                status: "ok",
                database: "ok",
            },
        ),
        Err(e) => {
            tracing::warn!(error = %e, "health check: database unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                HealthData {
                    status: "degraded",
                    database: "unavailable",
                },
            )
        }
    };

    (
        status,
        Json(HealthResponse {
            success: status == StatusCode::OK,
            data,
            request_id: req_id.0,
            timestamp: Utc::now(),
        }),
    )
}

#[cfg(test)]
mod tests;
