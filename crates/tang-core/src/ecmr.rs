//! ECMR (Elliptic Curve McCallum-Relyea) exchange, server side
//!
//! Only mode 1 lives here: the server multiplies the client's point by its
//! private scalar. Blinding and unblinding (point addition/subtraction) are
//! done by the client and never reach the server.

use p521::ProjectivePoint;

use crate::error::Result;
use crate::jwk::{KeyOp, PrivateJwk, PublicJwk, ALG_ECMR};

/// Compute `client_point * server_scalar` and return it as a public key.
///
/// Fails with `InvalidPoint` if the client coordinates are not on P-521 and
/// `InvalidScalar` if the server scalar is outside `[1, n-1]`.
pub fn ecmr_exchange(server: &PrivateJwk, client: &PublicJwk) -> Result<PublicJwk> {
    let client_point = client.to_affine()?;
    let scalar = server.scalar()?;

    let result = (ProjectivePoint::from(client_point) * *scalar).to_affine();

    PublicJwk::from_affine(&result, ALG_ECMR, &[KeyOp::DeriveKey])
}
