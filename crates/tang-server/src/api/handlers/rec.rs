//! Recovery Handler
//!
//! POST /rec/{thp}: multiply the client's point by the private scalar of
//! exchange key `thp` (active or rotated) and return the resulting point.

use axum::{
    body::{to_bytes, Body},
    extract::{Path, State},
    http::{header, HeaderMap},
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::{debug, warn};

use tang_core::ecmr_exchange;

use crate::api::error::ApiError;
use crate::api::handlers::AppState;
use crate::core::{authorize_exchange_key, validate_client_key, ClientKeyRequest};

/// Media type of the recovery response
pub const JWK_CONTENT_TYPE: &str = "application/jwk+json";

/// Largest accepted recovery request body, in bytes
pub const MAX_REQUEST_BODY: usize = 4096;

fn declared_length(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(header::CONTENT_LENGTH)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}

/// Recover with exchange key `thp`
///
/// POST /rec/{thp}
pub async fn recover(
    State(state): State<Arc<AppState>>,
    Path(thp): Path<String>,
    headers: HeaderMap,
    body: Body,
) -> Result<Response, ApiError> {
    if declared_length(&headers).is_some_and(|len| len > MAX_REQUEST_BODY as u64) {
        return Err(ApiError::PayloadTooLarge);
    }

    // A missing or lying Content-Length is caught by the read limit
    let bytes = to_bytes(body, MAX_REQUEST_BODY)
        .await
        .map_err(|_| ApiError::PayloadTooLarge)?;

    let request: ClientKeyRequest = serde_json::from_slice(&bytes)
        .map_err(|e| ApiError::BadRequest(format!("Invalid JSON: {}", e)))?;
    let client_key = validate_client_key(request)?;

    let keys = state.keys.ensure_active().await?;
    if keys.active.is_empty() {
        return Err(ApiError::Internal("No active keys available".into()));
    }

    let key = keys
        .find_by_thumbprint(&thp)
        .ok_or_else(|| ApiError::NotFound(format!("No key with thumbprint '{}'", thp)))?;

    let server_key = authorize_exchange_key(key).map_err(|e| {
        warn!(thp = %thp, reason = %e, "Recovery refused");
        ApiError::from(e)
    })?;

    let result = ecmr_exchange(server_key, &client_key).map_err(|e| {
        if e.is_invalid_crypto_input() {
            debug!(thp = %thp, error = %e, "Recovery rejected");
        } else {
            warn!(thp = %thp, error = %e, "Recovery failed");
        }
        ApiError::BadRequest(e.to_string())
    })?;

    let body = serde_json::to_string(&result)
        .map_err(|e| ApiError::Internal(format!("Failed to encode key: {}", e)))?;

    Ok(([(header::CONTENT_TYPE, JWK_CONTENT_TYPE)], body).into_response())
}
