//! In-memory storage backend
//!
//! Default backend for tests and development. Data is lost on restart.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

use super::{KeyStorage, StorageError};

/// In-memory key store implementation
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    /// Create a new in-memory store
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyStorage for MemoryStorage {
    async fn get(&self, name: &str) -> Result<Option<String>, StorageError> {
        let entries = self.entries.read().await;
        Ok(entries.get(name).cloned())
    }

    async fn put(&self, name: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.write().await;
        debug!(name = %name, "Storing entry");
        entries.insert(name.to_string(), value.to_string());
        Ok(())
    }

    async fn delete(&self, name: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.write().await;
        if entries.remove(name).is_some() {
            debug!(name = %name, "Deleted entry");
        }
        Ok(())
    }

    async fn list(&self) -> Result<Vec<String>, StorageError> {
        let entries = self.entries.read().await;
        Ok(entries.keys().cloned().collect())
    }
}
