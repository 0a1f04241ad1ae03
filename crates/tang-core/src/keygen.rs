//! Key generation for advertisement signing and ECMR exchange

use p521::SecretKey;
use rand::rngs::OsRng;

use crate::error::Result;
use crate::jwk::{KeyOp, PrivateJwk, ALG_ECMR, ALG_ES512};

fn generate(alg: &str, ops: &[KeyOp]) -> Result<PrivateJwk> {
    // The scalar is drawn uniformly from [1, n-1]
    let secret = SecretKey::random(&mut OsRng);
    PrivateJwk::from_secret_key(&secret, alg, ops)
}

/// Generate an ES512 (P-521 ECDSA) advertisement signing key
pub fn generate_signing_key() -> Result<PrivateJwk> {
    generate(ALG_ES512, &[KeyOp::Sign, KeyOp::Verify])
}

/// Generate an ECMR exchange key
pub fn generate_exchange_key() -> Result<PrivateJwk> {
    generate(ALG_ECMR, &[KeyOp::DeriveKey])
}
