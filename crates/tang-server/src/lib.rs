//! Tang Server
//!
//! HTTP server for the Tang network-bound key exchange protocol. Clients
//! bind secrets to this server's exchange keys; recovering them later
//! requires the server to multiply a blinded point by its private scalar.
//! The server never learns the bound secret.
//!
//! ## API Endpoints
//!
//! - `GET /` - Health check
//! - `GET /adv` - Signed advertisement of the active public keys
//! - `GET /adv/{thp}` - Advertisement additionally signed by key `thp`
//! - `POST /rec/{thp}` - ECMR recovery with exchange key `thp`
//! - `POST /rotate` - Replace all active keys (bearer token required)
//!
//! A trailing slash on any path is ignored.
//!
//! ## Storage
//!
//! Keys live behind the [`storage::KeyStorage`] trait. Active keys are
//! named `<thumbprint>.jwk`; rotated keys gain a leading dot and are only
//! used for recovery.

pub mod api;
pub mod config;
pub mod core;
pub mod keys;
pub mod storage;

pub use api::{create_router, TangService};
pub use api::handlers::AppState;
pub use config::{Args, ServerConfig, StorageKind};
pub use keys::{spawn_scheduled_rotation, KeyManager, KeySet};
pub use storage::{FileSystemStorage, KeyStorage, MemoryStorage, StorageError};
