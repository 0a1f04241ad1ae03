//! Key lifecycle manager
//!
//! Owns every interaction with storage:
//! - loading and classifying stored keys into a [`KeySet`]
//! - creating the first signing/exchange pair on demand
//! - rotating keys without ever leaving zero active keys
//!
//! Nothing here deletes key material; rotation is a rename.

use std::sync::Arc;
use tracing::{debug, info, warn};

use tang_core::{
    generate_exchange_key, generate_signing_key, Jwk, PrivateJwk, PublicJwk, TangError,
    ThumbprintAlgorithm, DEFAULT_THUMBPRINT_ALG,
};

use crate::storage::{KeyStorage, StorageError};

/// Suffix of every key entry
pub const KEY_SUFFIX: &str = ".jwk";

/// Prefix marking a rotated (retired) key entry
pub const ROTATED_PREFIX: &str = ".";

/// Errors raised while managing keys
#[derive(Debug, thiserror::Error)]
pub enum KeyManagerError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Key(#[from] TangError),
}

/// Is `name` a key entry at all
pub fn is_key_entry(name: &str) -> bool {
    name.ends_with(KEY_SUFFIX)
}

/// Is `name` a rotated key entry
pub fn is_rotated(name: &str) -> bool {
    name.starts_with(ROTATED_PREFIX)
}

/// Storage name for an active key with this thumbprint
pub fn active_name(thumbprint: &str) -> String {
    format!("{}{}", thumbprint, KEY_SUFFIX)
}

/// Storage name of `name` once rotated
pub fn rotated_name(name: &str) -> String {
    format!("{}{}", ROTATED_PREFIX, name)
}

/// Snapshot of stored keys, rebuilt from storage on every request
#[derive(Debug, Clone, Default)]
pub struct KeySet {
    /// Active keys (offered for new bindings)
    pub active: Vec<Jwk>,
    /// Rotated keys (kept so old bindings can still be recovered)
    pub rotated: Vec<Jwk>,
    /// Public projection of every active signing or exchange key
    pub payload: Vec<PublicJwk>,
    /// Active signing keys with their private scalar
    pub signers: Vec<PrivateJwk>,
}

impl KeySet {
    /// Classify loaded keys and derive the advertisement sets
    pub fn new(active: Vec<Jwk>, rotated: Vec<Jwk>) -> Self {
        let mut payload = Vec::new();
        let mut signers = Vec::new();

        for key in &active {
            if key.is_signing_key() {
                payload.push(key.to_public());
                match key.as_private() {
                    Some(private) => signers.push(private.clone()),
                    None => warn!(
                        x = %key.public().x,
                        "Active signing key has no private scalar; advertising without it"
                    ),
                }
            } else if key.is_exchange_key() {
                payload.push(key.to_public());
            }
        }

        Self {
            active,
            rotated,
            payload,
            signers,
        }
    }

    /// Find a key by thumbprint, active keys first, then rotated.
    ///
    /// The client may have computed the thumbprint with any supported
    /// hash, so each key is tried under every algorithm.
    pub fn find_by_thumbprint(&self, thumbprint: &str) -> Option<&Jwk> {
        self.active.iter().chain(self.rotated.iter()).find(|key| {
            ThumbprintAlgorithm::ALL.iter().any(|alg| {
                key.thumbprint(*alg)
                    .map(|computed| computed == thumbprint)
                    .unwrap_or(false)
            })
        })
    }
}

/// Key lifecycle manager over an abstract storage backend
#[derive(Debug, Clone)]
pub struct KeyManager {
    storage: Arc<dyn KeyStorage>,
}

impl KeyManager {
    pub fn new(storage: Arc<dyn KeyStorage>) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &Arc<dyn KeyStorage> {
        &self.storage
    }

    /// Load every key entry from storage.
    ///
    /// Entries that vanish between `list` and `get`, or that do not parse,
    /// are skipped with a warning: storage may be eventually consistent or
    /// mid-rotation, and one bad file must not take the server down.
    pub async fn load(&self) -> Result<KeySet, KeyManagerError> {
        let mut active = Vec::new();
        let mut rotated = Vec::new();

        for name in self.storage.list().await? {
            if !is_key_entry(&name) {
                continue;
            }

            let Some(content) = self.storage.get(&name).await? else {
                debug!(name = %name, "Key entry disappeared before it could be read");
                continue;
            };

            let key: Jwk = match serde_json::from_str(&content) {
                Ok(key) => key,
                Err(e) => {
                    warn!(name = %name, error = %e, "Skipping unparsable key entry");
                    continue;
                }
            };

            if is_rotated(&name) {
                rotated.push(key);
            } else {
                active.push(key);
            }
        }

        Ok(KeySet::new(active, rotated))
    }

    /// Persist a key under its S256 thumbprint, returning the entry name
    pub async fn save(&self, key: &PrivateJwk) -> Result<String, KeyManagerError> {
        let thumbprint = key.public().thumbprint(DEFAULT_THUMBPRINT_ALG)?;
        let name = active_name(&thumbprint);
        let content = serde_json::to_string(key).map_err(TangError::from)?;

        self.storage.put(&name, &content).await?;
        info!(name = %name, alg = ?key.public().alg, "Saved key");
        Ok(name)
    }

    /// Generate and persist a fresh signing + exchange pair
    async fn create_pair(&self) -> Result<(String, String), KeyManagerError> {
        let signing = self.save(&generate_signing_key()?).await?;
        let exchange = self.save(&generate_exchange_key()?).await?;
        Ok((signing, exchange))
    }

    /// Make sure at least one active key exists, generating a pair if not.
    ///
    /// Concurrent callers that both see an empty set may both create a
    /// pair; the result is extra active keys, never zero.
    pub async fn ensure_active(&self) -> Result<KeySet, KeyManagerError> {
        let keys = self.load().await?;
        if !keys.active.is_empty() {
            return Ok(keys);
        }

        info!("No active keys found, generating initial key pair");
        self.create_pair().await?;
        self.load().await
    }

    /// Retire one key entry: write `.<name>`, then delete `<name>`.
    ///
    /// A crash between the two steps leaves the key duplicated, not lost.
    /// Already-rotated and missing entries are left alone.
    pub async fn rotate_one(&self, name: &str) -> Result<(), KeyManagerError> {
        if is_rotated(name) {
            return Ok(());
        }

        let Some(content) = self.storage.get(name).await? else {
            return Ok(());
        };

        let retired = rotated_name(name);
        self.storage.put(&retired, &content).await?;
        self.storage.delete(name).await?;

        info!(from = %name, to = %retired, "Rotated key");
        Ok(())
    }

    /// Replace every active key with a freshly generated pair.
    ///
    /// The new pair is committed before any existing key is touched, so
    /// storage always holds at least one active signing and exchange key.
    pub async fn rotate_all(&self) -> Result<KeySet, KeyManagerError> {
        let (signing, exchange) = self.create_pair().await?;

        let mut rotated = 0usize;
        for name in self.storage.list().await? {
            if !is_key_entry(&name) || is_rotated(&name) {
                continue;
            }
            if name == signing || name == exchange {
                continue;
            }
            self.rotate_one(&name).await?;
            rotated += 1;
        }

        info!(
            new_signing = %signing,
            new_exchange = %exchange,
            rotated = rotated,
            "Key rotation complete"
        );

        self.load().await
    }
}
