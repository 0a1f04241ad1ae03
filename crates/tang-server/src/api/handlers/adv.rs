//! Advertisement Handlers
//!
//! Serve the signed set of active public keys. Clients pin a signing key
//! on first contact and later request `/adv/{thp}` so that the response is
//! also signed by the key they trust, even after it was rotated.

use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::{debug, error};

use tang_core::{sign_advertisement, PrivateJwk};

use crate::api::error::ApiError;
use crate::api::handlers::AppState;
use crate::keys::KeySet;

/// Media type of the advertisement
pub const JOSE_CONTENT_TYPE: &str = "application/jose+json";

fn signed_response(keys: &KeySet, signers: &[PrivateJwk]) -> Result<Response, ApiError> {
    // Every input here came from storage, so any failure is ours
    let jws = sign_advertisement(&keys.payload, signers).map_err(|e| {
        error!(error = %e, "Failed to sign advertisement");
        ApiError::Internal("Failed to sign advertisement".into())
    })?;
    let body = serde_json::to_string(&jws)
        .map_err(|e| ApiError::Internal(format!("Failed to encode advertisement: {}", e)))?;

    debug!(
        keys = keys.payload.len(),
        signatures = jws.signatures.len(),
        "Serving advertisement"
    );

    Ok(([(header::CONTENT_TYPE, JOSE_CONTENT_TYPE)], body).into_response())
}

async fn advertised_keys(state: &AppState) -> Result<KeySet, ApiError> {
    let keys = state.keys.ensure_active().await?;
    if keys.signers.is_empty() || keys.payload.is_empty() {
        return Err(ApiError::Internal("No signing keys available".into()));
    }
    Ok(keys)
}

/// Advertise the active key set
///
/// GET /adv
pub async fn advertise(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    let keys = advertised_keys(&state).await?;
    signed_response(&keys, &keys.signers)
}

/// Advertise the active key set, additionally signed by the key `thp`
///
/// GET /adv/{thp}
///
/// `thp` may name a rotated signing key. Exchange keys and unknown
/// thumbprints are both reported as not found.
pub async fn advertise_with_key(
    State(state): State<Arc<AppState>>,
    Path(thp): Path<String>,
) -> Result<Response, ApiError> {
    let keys = advertised_keys(&state).await?;

    let extra = keys
        .find_by_thumbprint(&thp)
        .filter(|key| key.is_signing_key())
        .and_then(|key| key.as_private())
        .ok_or_else(|| ApiError::NotFound(format!("No signing key with thumbprint '{}'", thp)))?;

    let mut signers = keys.signers.clone();
    if !signers.iter().any(|s| s.public().same_point(extra.public())) {
        signers.push(extra.clone());
    }

    signed_response(&keys, &signers)
}
