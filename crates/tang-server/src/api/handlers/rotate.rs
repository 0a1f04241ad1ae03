//! Rotation Handler

use axum::{
    extract::State,
    http::{header, HeaderMap},
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

use crate::api::error::ApiError;
use crate::api::handlers::AppState;
use crate::core::constant_time_eq;

/// Response from a successful rotation
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RotateResponse {
    pub message: String,
    /// Active keys after rotation (the fresh pair)
    pub active_keys: usize,
    /// Rotated keys, including every earlier generation
    pub rotated_keys: usize,
}

/// Rotate all active keys
///
/// POST /rotate
///
/// Requires `Authorization: Bearer <token>`. Without a configured token
/// the endpoint is disabled and reports a server error.
pub async fn rotate_keys(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<RotateResponse>, ApiError> {
    let token = state
        .rotate_token
        .as_deref()
        .ok_or_else(|| ApiError::Unconfigured("Key rotation is not configured".into()))?;

    let expected = format!("Bearer {}", token);
    let provided = headers
        .get(header::AUTHORIZATION)
        .map(|value| value.as_bytes())
        .unwrap_or_default();

    if !constant_time_eq(provided, expected.as_bytes()) {
        warn!("Rejected rotation request with invalid credentials");
        return Err(ApiError::Unauthorized);
    }

    let keys = state.keys.rotate_all().await?;

    info!(
        active = keys.active.len(),
        rotated = keys.rotated.len(),
        "Rotated keys on request"
    );

    Ok(Json(RotateResponse {
        message: "Keys rotated successfully".into(),
        active_keys: keys.active.len(),
        rotated_keys: keys.rotated.len(),
    }))
}
