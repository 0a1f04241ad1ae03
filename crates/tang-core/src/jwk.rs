//! JSON Web Key model for P-521 keys
//!
//! A stored key is either [`PrivateJwk`] (public members plus the scalar `d`)
//! or [`PublicJwk`]. Projection only goes one way: private → public.

use std::fmt;

use p521::elliptic_curve::sec1::{FromEncodedPoint, ToEncodedPoint};
use p521::{AffinePoint, EncodedPoint, FieldBytes, NonZeroScalar, SecretKey};
use serde::{Deserialize, Serialize};

use crate::codec::{self, ThumbprintAlgorithm};
use crate::error::{Result, TangError};

/// Key type for elliptic curve keys
pub const KTY_EC: &str = "EC";
/// The only curve this server speaks
pub const CRV_P521: &str = "P-521";
/// Role tag of advertisement signing keys
pub const ALG_ES512: &str = "ES512";
/// Role tag of exchange (recovery) keys
pub const ALG_ECMR: &str = "ECMR";

/// Capabilities a key may declare in `key_ops`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyOp {
    Sign,
    Verify,
    DeriveKey,
}

impl KeyOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyOp::Sign => "sign",
            KeyOp::Verify => "verify",
            KeyOp::DeriveKey => "deriveKey",
        }
    }
}

impl fmt::Display for KeyOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Public EC key: the only form ever sent to clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicJwk {
    pub kty: String,
    pub crv: String,
    pub x: String,
    pub y: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alg: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_ops: Option<Vec<String>>,
}

impl PublicJwk {
    /// Build a P-521 public key from an affine point
    pub fn from_affine(point: &AffinePoint, alg: &str, ops: &[KeyOp]) -> Result<Self> {
        let encoded = point.to_encoded_point(false);
        let (x, y) = match (encoded.x(), encoded.y()) {
            (Some(x), Some(y)) => (x, y),
            _ => {
                return Err(TangError::InvalidPoint(
                    "Point at infinity has no affine coordinates".into(),
                ))
            }
        };

        Ok(Self {
            kty: KTY_EC.into(),
            crv: CRV_P521.into(),
            x: codec::encode_field_element(x)?,
            y: codec::encode_field_element(y)?,
            alg: Some(alg.into()),
            key_ops: Some(ops.iter().map(|op| op.as_str().to_string()).collect()),
        })
    }

    /// Check whether `key_ops` declares the given capability
    pub fn has_op(&self, op: KeyOp) -> bool {
        self.key_ops
            .as_ref()
            .is_some_and(|ops| ops.iter().any(|o| o == op.as_str()))
    }

    /// Usable for advertisement signing: needs both `sign` and `verify`
    pub fn is_signing_key(&self) -> bool {
        self.has_op(KeyOp::Sign) && self.has_op(KeyOp::Verify)
    }

    /// Usable for ECMR exchange
    pub fn is_exchange_key(&self) -> bool {
        self.has_op(KeyOp::DeriveKey)
    }

    /// Whether `alg` is either absent or equal to `expected`
    pub fn alg_is_absent_or(&self, expected: &str) -> bool {
        self.alg.as_deref().map_or(true, |alg| alg == expected)
    }

    /// Same curve point (coordinate equality)
    pub fn same_point(&self, other: &PublicJwk) -> bool {
        self.x == other.x && self.y == other.y
    }

    /// RFC 7638 thumbprint of this key
    pub fn thumbprint(&self, alg: ThumbprintAlgorithm) -> Result<String> {
        codec::thumbprint(self, alg)
    }

    /// Decode the coordinates and require the point to lie on P-521
    pub fn to_affine(&self) -> Result<AffinePoint> {
        let x = codec::decode_field_element(&self.x)
            .map_err(|e| TangError::InvalidPoint(format!("x coordinate: {}", e)))?;
        let y = codec::decode_field_element(&self.y)
            .map_err(|e| TangError::InvalidPoint(format!("y coordinate: {}", e)))?;

        let encoded = EncodedPoint::from_affine_coordinates(&x, &y, false);

        Option::from(AffinePoint::from_encoded_point(&encoded))
            .ok_or_else(|| TangError::InvalidPoint("Point is not on P-521".into()))
    }
}

/// Private EC key as persisted in storage
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrivateJwk {
    #[serde(flatten)]
    public: PublicJwk,
    d: String,
}

impl fmt::Debug for PrivateJwk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateJwk")
            .field("public", &self.public)
            .field("d", &"[redacted]")
            .finish()
    }
}

impl PrivateJwk {
    /// Wrap public members and a base64url scalar. The scalar is range
    /// checked lazily, when it is first used.
    pub fn new(public: PublicJwk, d: impl Into<String>) -> Self {
        Self { public, d: d.into() }
    }

    /// Build a JWK from a freshly generated secret key
    pub fn from_secret_key(secret: &SecretKey, alg: &str, ops: &[KeyOp]) -> Result<Self> {
        let point = *secret.public_key().as_affine();
        let public = PublicJwk::from_affine(&point, alg, ops)?;
        let d = codec::encode_field_element(&secret.to_bytes())?;
        Ok(Self::new(public, d))
    }

    pub fn public(&self) -> &PublicJwk {
        &self.public
    }

    /// Base64url private scalar
    pub fn d(&self) -> &str {
        &self.d
    }

    fn scalar_bytes(&self) -> Result<FieldBytes> {
        codec::decode_field_element(&self.d).map_err(|e| TangError::InvalidScalar(e.to_string()))
    }

    /// Decode the private scalar, requiring `0 < d < n`
    pub fn scalar(&self) -> Result<NonZeroScalar> {
        Option::from(NonZeroScalar::from_repr(self.scalar_bytes()?)).ok_or_else(|| {
            TangError::InvalidScalar("Scalar is zero or not below the curve order".into())
        })
    }

    /// ECDSA signing key for this scalar
    pub fn signing_key(&self) -> Result<p521::ecdsa::SigningKey> {
        // Range check first so a bad scalar reports as InvalidScalar
        self.scalar()?;
        Ok(p521::ecdsa::SigningKey::from_bytes(&self.scalar_bytes()?)?)
    }
}

impl From<&PrivateJwk> for PublicJwk {
    fn from(key: &PrivateJwk) -> Self {
        key.public.clone()
    }
}

impl From<PrivateJwk> for PublicJwk {
    fn from(key: PrivateJwk) -> Self {
        key.public
    }
}

/// A stored key in either form.
///
/// On the wire the variants are distinguished only by the presence of `d`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Jwk {
    Private(PrivateJwk),
    Public(PublicJwk),
}

impl Jwk {
    /// Public members, whichever variant this is
    pub fn public(&self) -> &PublicJwk {
        match self {
            Jwk::Private(key) => key.public(),
            Jwk::Public(key) => key,
        }
    }

    /// Public projection, preserving `alg` and `key_ops`
    pub fn to_public(&self) -> PublicJwk {
        self.public().clone()
    }

    pub fn as_private(&self) -> Option<&PrivateJwk> {
        match self {
            Jwk::Private(key) => Some(key),
            Jwk::Public(_) => None,
        }
    }

    pub fn has_op(&self, op: KeyOp) -> bool {
        self.public().has_op(op)
    }

    pub fn is_signing_key(&self) -> bool {
        self.public().is_signing_key()
    }

    pub fn is_exchange_key(&self) -> bool {
        self.public().is_exchange_key()
    }

    pub fn thumbprint(&self, alg: ThumbprintAlgorithm) -> Result<String> {
        self.public().thumbprint(alg)
    }
}

impl From<PrivateJwk> for Jwk {
    fn from(key: PrivateJwk) -> Self {
        Jwk::Private(key)
    }
}

impl From<PublicJwk> for Jwk {
    fn from(key: PublicJwk) -> Self {
        Jwk::Public(key)
    }
}
