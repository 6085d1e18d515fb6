use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use tokio::sync::Mutex;
use uuid::Uuid;

const VENDOR_KEYS_VAR: &str = "KIRANA_VENDOR_KEYS";
const VENDOR_ID_HEADER: &str = "x-vendor-id";

/// Newtype wrapping a request ID string, stored as a request extension.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// Authenticated vendor, stored as a request extension by [`require_vendor_auth`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VendorId(pub i64);

type TokenDigest = [u8; 32];

/// Vendor bearer-token settings used by middleware.
///
/// Tokens are held only as salted SHA-256 digests.
#[derive(Clone)]
pub struct AuthState {
    keys: Arc<Vec<(i64, TokenDigest)>>,
    salt: Arc<str>,
    pub enabled: bool,
}

impl std::fmt::Debug for AuthState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthState")
            .field("vendor_keys", &self.keys.len())
            .field("enabled", &self.enabled)
            .finish_non_exhaustive()
    }
}

impl AuthState {
    /// Builds auth config from `KIRANA_VENDOR_KEYS`.
    ///
    /// # Errors
    ///
    /// See [`AuthState::new`].
    pub fn from_env(is_development: bool, salt: &str) -> anyhow::Result<Self> {
        let raw = std::env::var(VENDOR_KEYS_VAR).unwrap_or_default();
        Self::new(&raw, salt, is_development)
    }

    /// Parses comma-separated `vendor_id:token` pairs.
    ///
    /// In development, empty keys disable auth and the `x-vendor-id` header
    /// supplies the vendor identity. Elsewhere, empty keys fail startup.
    ///
    /// # Errors
    ///
    /// Returns an error for malformed pairs, or for empty keys outside
    /// development.
    pub fn new(raw: &str, salt: &str, is_development: bool) -> anyhow::Result<Self> {
        let mut keys = Vec::new();
        for pair in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let Some((vendor, token)) = pair.split_once(':') else {
                anyhow::bail!("{VENDOR_KEYS_VAR} entries must look like vendor_id:token");
            };
            let vendor_id: i64 = vendor.trim().parse().map_err(|_| {
                anyhow::anyhow!("{VENDOR_KEYS_VAR} has a non-numeric vendor id: {vendor:?}")
            })?;
            let token = token.trim();
            if token.is_empty() {
                anyhow::bail!("{VENDOR_KEYS_VAR} has an empty token for vendor {vendor_id}");
            }
            keys.push((vendor_id, hash_token(salt, token)));
        }

        if keys.is_empty() {
            if is_development {
                tracing::warn!(
                    "{VENDOR_KEYS_VAR} not set; bearer auth disabled, vendor taken from x-vendor-id"
                );
                return Ok(Self {
                    keys: Arc::new(Vec::new()),
                    salt: Arc::from(salt),
                    enabled: false,
                });
            }

            anyhow::bail!(
                "{VENDOR_KEYS_VAR} is required outside development; provide vendor_id:token pairs"
            );
        }

        Ok(Self {
            keys: Arc::new(keys),
            salt: Arc::from(salt),
            enabled: true,
        })
    }

    /// Vendor owning `token`, compared in constant time against every key.
    fn authenticate(&self, token: &str) -> Option<i64> {
        let digest = hash_token(&self.salt, token);
        let mut matched = None;
        for (vendor_id, expected) in self.keys.iter() {
            if bool::from(expected[..].ct_eq(&digest[..])) {
                matched = Some(*vendor_id);
            }
        }
        matched
    }
}

fn hash_token(salt: &str, token: &str) -> TokenDigest {
    Sha256::new()
        .chain_update(salt.as_bytes())
        .chain_update(b":")
        .chain_update(token.as_bytes())
        .finalize()
        .into()
}

#[derive(Debug, Clone)]
struct RateLimitWindow {
    started_at: Instant,
    count: usize,
}

/// Fixed-window limiter shared by all protected routes.
#[derive(Debug, Clone)]
pub struct RateLimitState {
    max_requests: usize,
    window: Duration,
    state: Arc<Mutex<RateLimitWindow>>,
}

impl RateLimitState {
    #[must_use]
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            state: Arc::new(Mutex::new(RateLimitWindow {
                started_at: Instant::now(),
                count: 0,
            })),
        }
    }

    #[must_use]
    pub fn from_app_config(config: &kirana_core::AppConfig) -> Self {
        Self::new(
            config.rate_limit_max_requests,
            Duration::from_secs(config.rate_limit_window_secs),
        )
    }
}

#[derive(Debug, Serialize)]
struct MiddlewareErrorBody {
    success: bool,
    error: &'static str,
    code: &'static str,
}

fn reject(status: StatusCode, code: &'static str, error: &'static str) -> Response {
    (
        status,
        Json(MiddlewareErrorBody {
            success: false,
            error,
            code,
        }),
    )
        .into_response()
}

/// Axum middleware that extracts or generates a request ID.
///
/// If the incoming request has an `x-request-id` header, that value is used.
/// Otherwise a new `UUIDv4` is generated. The ID is:
/// - Inserted into request extensions as [`RequestId`]
/// - Set on the response as the `x-request-id` header
pub async fn request_id(mut req: Request, next: Next) -> Response {
    let id = req
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map_or_else(|| Uuid::new_v4().to_string(), String::from);

    req.extensions_mut().insert(RequestId(id.clone()));

    let mut res = next.run(req).await;

    if let Ok(val) = HeaderValue::from_str(&id) {
        res.headers_mut().insert("x-request-id", val);
    }

    res
}

/// Resolves the calling vendor and stores it as a [`VendorId`] extension.
pub async fn require_vendor_auth(
    State(auth): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Response {
    let vendor_id = if auth.enabled {
        let token = extract_bearer_token(req.headers().get(AUTHORIZATION));
        match token.and_then(|t| auth.authenticate(t)) {
            Some(id) => id,
            None => {
                return reject(
                    StatusCode::UNAUTHORIZED,
                    "unauthorized",
                    "missing or invalid bearer token",
                )
            }
        }
    } else {
        let header = req
            .headers()
            .get(VENDOR_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<i64>().ok());
        match header {
            Some(id) => id,
            None => {
                return reject(
                    StatusCode::UNAUTHORIZED,
                    "unauthorized",
                    "missing or invalid x-vendor-id header",
                )
            }
        }
    };

    req.extensions_mut().insert(VendorId(vendor_id));
    next.run(req).await
}

/// Middleware enforcing a fixed request-per-window limit.
pub async fn enforce_rate_limit(
    State(rate_limit): State<RateLimitState>,
    req: Request,
    next: Next,
) -> Response {
    let mut window = rate_limit.state.lock().await;
    let elapsed = window.started_at.elapsed();

    if elapsed >= rate_limit.window {
        window.started_at = Instant::now();
        window.count = 0;
    }

    if window.count >= rate_limit.max_requests {
        return reject(
            StatusCode::TOO_MANY_REQUESTS,
            "rate_limited",
            "rate limit exceeded",
        );
    }

    window.count += 1;
    drop(window);

    next.run(req).await
}

fn extract_bearer_token(value: Option<&HeaderValue>) -> Option<&str> {
    value
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .filter(|s| !s.trim().is_empty())
}
