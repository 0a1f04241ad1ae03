//! Request validation for the Tang endpoints
//!
//! Everything here runs before any curve arithmetic: untrusted client keys
//! are checked structurally, server keys are checked for the role the
//! request wants to use them in, and bearer credentials are compared in
//! constant time.

use serde::Deserialize;
use tang_core::jwk::{ALG_ECMR, CRV_P521, KTY_EC};
use tang_core::{Jwk, PrivateJwk, PublicJwk, TangError};
use thiserror::Error;
use tracing::warn;

/// Longest accepted base64url coordinate. A P-521 coordinate is 88
/// characters; anything well past that is rejected before decoding.
pub const MAX_COORDINATE_LEN: usize = 120;

/// Client key as it arrives on the wire.
///
/// Every member is optional so that a missing field is reported as an
/// invalid key rather than a JSON syntax error.
#[derive(Debug, Default, Deserialize)]
pub struct ClientKeyRequest {
    pub kty: Option<String>,
    pub crv: Option<String>,
    pub x: Option<String>,
    pub y: Option<String>,
    pub alg: Option<String>,
    pub key_ops: Option<Vec<String>>,
}

fn invalid(msg: impl Into<String>) -> TangError {
    TangError::InvalidKeyStructure(msg.into())
}

fn coordinate(name: &str, value: Option<String>) -> Result<String, TangError> {
    let value = value.ok_or_else(|| invalid(format!("missing '{}' coordinate", name)))?;
    if value.is_empty() {
        return Err(invalid(format!("empty '{}' coordinate", name)));
    }
    if value.len() > MAX_COORDINATE_LEN {
        return Err(invalid(format!(
            "'{}' coordinate exceeds {} characters",
            name, MAX_COORDINATE_LEN
        )));
    }
    Ok(value)
}

/// Validate the structure of a client-supplied exchange key.
///
/// Checks kty, crv, coordinate presence and length, and alg. Whether the
/// point is actually on the curve is decided later by the exchange itself.
pub fn validate_client_key(request: ClientKeyRequest) -> Result<PublicJwk, TangError> {
    match request.kty.as_deref() {
        Some(KTY_EC) => {}
        Some(other) => return Err(invalid(format!("unsupported key type '{}'", other))),
        None => return Err(invalid("missing 'kty'")),
    }

    match request.crv.as_deref() {
        Some(CRV_P521) => {}
        Some(other) => return Err(invalid(format!("unsupported curve '{}'", other))),
        None => return Err(invalid("missing 'crv'")),
    }

    let x = coordinate("x", request.x)?;
    let y = coordinate("y", request.y)?;

    if let Some(alg) = request.alg.as_deref() {
        if alg != ALG_ECMR {
            return Err(invalid(format!("unsupported algorithm '{}'", alg)));
        }
    }

    Ok(PublicJwk {
        kty: KTY_EC.into(),
        crv: CRV_P521.into(),
        x,
        y,
        alg: request.alg,
        key_ops: request.key_ops,
    })
}

/// Why a stored key may not serve a recovery request
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExchangeKeyError {
    #[error("Key is not an exchange key")]
    NotExchangeKey,

    #[error("Key has no private component")]
    NotPrivate,

    #[error("Key algorithm '{0}' is not ECMR")]
    WrongAlgorithm(String),
}

/// Check that a stored key may be used for ECMR and return its private form
pub fn authorize_exchange_key(key: &Jwk) -> Result<&PrivateJwk, ExchangeKeyError> {
    if !key.is_exchange_key() {
        return Err(ExchangeKeyError::NotExchangeKey);
    }

    let private = key.as_private().ok_or(ExchangeKeyError::NotPrivate)?;

    if !private.public().alg_is_absent_or(ALG_ECMR) {
        let alg = private.public().alg.clone().unwrap_or_default();
        warn!(alg = %alg, "Refusing exchange with non-ECMR key");
        return Err(ExchangeKeyError::WrongAlgorithm(alg));
    }

    Ok(private)
}

/// Compare two byte strings without short-circuiting on the first
/// difference or on a length mismatch.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    let mut diff = a.len() ^ b.len();
    for i in 0..a.len().max(b.len()) {
        let x = a.get(i).copied().unwrap_or(0);
        let y = b.get(i).copied().unwrap_or(0);
        diff |= usize::from(x ^ y);
    }
    diff == 0
}
