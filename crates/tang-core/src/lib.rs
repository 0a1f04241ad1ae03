//! # Tang Core
//!
//! Host-independent primitives for the server side of the Tang
//! network-bound key exchange protocol.
//!
//! ## Key Concepts
//!
//! - **Advertisement**: a JWS over the public JWK set, signed by every
//!   active ES512 key
//! - **Recovery (ECMR)**: the server multiplies a client-supplied P-521
//!   point by an exchange key's private scalar
//! - **Thumbprint**: RFC 7638 key identifier; clients may compute it with
//!   any supported hash, so lookups try all of them
//!
//! Storage, key lifecycle and HTTP live in `tang-server`.

pub mod codec;
pub mod ecmr;
pub mod error;
pub mod jwk;
pub mod jws;
pub mod keygen;

pub use codec::{thumbprint, ThumbprintAlgorithm, DEFAULT_THUMBPRINT_ALG};
pub use ecmr::ecmr_exchange;
pub use error::{Result, TangError};
pub use jwk::{Jwk, KeyOp, PrivateJwk, PublicJwk};
pub use jws::{sign_advertisement, Jws, JwsSignature};
pub use keygen::{generate_exchange_key, generate_signing_key};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
