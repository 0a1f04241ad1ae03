//! Error types for the Tang primitives

use thiserror::Error;

/// Result type alias using TangError
pub type Result<T> = std::result::Result<T, TangError>;

/// Errors that can occur while encoding, validating or using keys
#[derive(Error, Debug)]
pub enum TangError {
    /// Input could not be decoded at all (bad base64url, bad JSON)
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// Key is well-formed JSON but not a usable JWK for this server
    #[error("Invalid key structure: {0}")]
    InvalidKeyStructure(String),

    /// Client point does not lie on P-521
    #[error("Invalid point: {0}")]
    InvalidPoint(String),

    /// Private scalar is zero or not below the curve order
    #[error("Invalid scalar: {0}")]
    InvalidScalar(String),

    /// Thumbprint hash identifier outside the supported registry
    #[error("Unsupported hash algorithm: {0}")]
    UnsupportedHashAlgorithm(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Signing failure inside the curve library
    #[error("Cryptographic error: {0}")]
    Crypto(String),
}

impl TangError {
    /// True for errors caused by untrusted cryptographic input
    /// (off-curve points, out-of-range scalars).
    pub fn is_invalid_crypto_input(&self) -> bool {
        matches!(self, TangError::InvalidPoint(_) | TangError::InvalidScalar(_))
    }
}

impl From<serde_json::Error> for TangError {
    fn from(err: serde_json::Error) -> Self {
        TangError::Serialization(err.to_string())
    }
}

impl From<base64::DecodeError> for TangError {
    fn from(err: base64::DecodeError) -> Self {
        TangError::MalformedInput(format!("Invalid base64url encoding: {}", err))
    }
}

impl From<p521::ecdsa::Error> for TangError {
    fn from(err: p521::ecdsa::Error) -> Self {
        TangError::Crypto(err.to_string())
    }
}
