//! Encoding primitives shared by every JWK/JWS operation
//!
//! - base64url without padding (RFC 7515 §2)
//! - fixed-width big-endian integers for P-521 coordinates and scalars
//! - JWK thumbprints (RFC 7638) under a small registry of hash algorithms

use std::fmt;
use std::str::FromStr;

use base64::{
    alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
    Engine,
};
use p521::FieldBytes;
use serde::Serialize;
use sha1::Sha1;
use sha2::{Digest, Sha256, Sha384, Sha512};

use crate::error::{Result, TangError};
use crate::jwk::PublicJwk;

/// Byte length of a P-521 field element (coordinates and private scalars)
pub const COORDINATE_LEN: usize = 66;

/// URL-safe alphabet, no padding on encode, padding accepted on decode
const BASE64URL: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Encode bytes as unpadded base64url
pub fn base64url_encode(data: impl AsRef<[u8]>) -> String {
    BASE64URL.encode(data)
}

/// Decode base64url, with or without trailing `=` padding
pub fn base64url_decode(data: &str) -> Result<Vec<u8>> {
    Ok(BASE64URL.decode(data)?)
}

/// Left-pad a big-endian unsigned integer to exactly `width` bytes.
///
/// Leading zero bytes in `magnitude` are ignored, so a value that was
/// already padded (or over-padded) by a peer normalizes to the same output.
pub fn to_fixed_width(magnitude: &[u8], width: usize) -> Result<Vec<u8>> {
    let significant = from_fixed_width(magnitude);
    if significant.len() > width {
        return Err(TangError::InvalidKeyStructure(format!(
            "Integer of {} bytes does not fit in {} bytes",
            significant.len(),
            width
        )));
    }

    let mut out = vec![0u8; width];
    out[width - significant.len()..].copy_from_slice(significant);
    Ok(out)
}

/// Strip leading zero bytes, returning the minimal big-endian magnitude
pub fn from_fixed_width(bytes: &[u8]) -> &[u8] {
    let start = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len());
    &bytes[start..]
}

/// Decode a base64url field element into exactly [`COORDINATE_LEN`] bytes
pub fn decode_field_element(encoded: &str) -> Result<FieldBytes> {
    let raw = base64url_decode(encoded)?;
    let padded = to_fixed_width(&raw, COORDINATE_LEN)?;

    let mut out = FieldBytes::default();
    out.copy_from_slice(&padded);
    Ok(out)
}

/// Encode a field element as base64url, always 66 bytes before encoding
pub fn encode_field_element(bytes: &[u8]) -> Result<String> {
    Ok(base64url_encode(to_fixed_width(bytes, COORDINATE_LEN)?))
}

// =============================================================================
// Thumbprints
// =============================================================================

/// Hash algorithms accepted for JWK thumbprints.
///
/// `S224` is not offered: the edge runtimes this server was first deployed
/// on have no SHA-224, and thumbprints must agree across deployments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ThumbprintAlgorithm {
    S1,
    S256,
    S384,
    S512,
}

/// Algorithm used to name stored keys
pub const DEFAULT_THUMBPRINT_ALG: ThumbprintAlgorithm = ThumbprintAlgorithm::S256;

impl ThumbprintAlgorithm {
    /// Every supported algorithm, in lookup order
    pub const ALL: [ThumbprintAlgorithm; 4] = [
        ThumbprintAlgorithm::S1,
        ThumbprintAlgorithm::S256,
        ThumbprintAlgorithm::S384,
        ThumbprintAlgorithm::S512,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ThumbprintAlgorithm::S1 => "S1",
            ThumbprintAlgorithm::S256 => "S256",
            ThumbprintAlgorithm::S384 => "S384",
            ThumbprintAlgorithm::S512 => "S512",
        }
    }

    fn digest(&self, data: &[u8]) -> Vec<u8> {
        match self {
            ThumbprintAlgorithm::S1 => Sha1::digest(data).to_vec(),
            ThumbprintAlgorithm::S256 => Sha256::digest(data).to_vec(),
            ThumbprintAlgorithm::S384 => Sha384::digest(data).to_vec(),
            ThumbprintAlgorithm::S512 => Sha512::digest(data).to_vec(),
        }
    }
}

impl fmt::Display for ThumbprintAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThumbprintAlgorithm {
    type Err = TangError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|alg| alg.as_str() == s)
            .ok_or_else(|| TangError::UnsupportedHashAlgorithm(s.to_string()))
    }
}

/// RFC 7638 required members for an EC key, in lexicographic order.
/// Serde keeps declaration order, which makes this the canonical form.
#[derive(Serialize)]
struct ThumbprintInput<'a> {
    crv: &'a str,
    kty: &'a str,
    x: &'a str,
    y: &'a str,
}

/// Compute the base64url JWK thumbprint of a key's public members
pub fn thumbprint(key: &PublicJwk, alg: ThumbprintAlgorithm) -> Result<String> {
    let canonical = serde_json::to_vec(&ThumbprintInput {
        crv: &key.crv,
        kty: &key.kty,
        x: &key.x,
        y: &key.y,
    })?;

    Ok(base64url_encode(alg.digest(&canonical)))
}

/// Thumbprint with the algorithm given by its JOSE identifier (`S256`, ...)
pub fn thumbprint_named(key: &PublicJwk, alg: &str) -> Result<String> {
    thumbprint(key, alg.parse()?)
}
