//! API request handlers

pub mod adv;
pub mod rec;
pub mod rotate;

pub use adv::{advertise, advertise_with_key, JOSE_CONTENT_TYPE};
pub use rec::{recover, JWK_CONTENT_TYPE, MAX_REQUEST_BODY};
pub use rotate::{rotate_keys, RotateResponse};

use std::sync::Arc;

use crate::keys::KeyManager;
use crate::storage::KeyStorage;

/// Application state shared across handlers
///
/// Immutable after startup; every request reloads keys from storage.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Key lifecycle over the configured backend
    pub keys: KeyManager,
    /// Bearer token guarding `/rotate`; rotation is disabled when unset
    pub rotate_token: Option<String>,
}

impl AppState {
    pub fn new(storage: Arc<dyn KeyStorage>, rotate_token: Option<String>) -> Self {
        Self {
            keys: KeyManager::new(storage),
            rotate_token,
        }
    }
}
