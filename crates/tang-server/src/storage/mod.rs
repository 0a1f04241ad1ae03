//! Storage abstraction for Tang keys
//!
//! Keys are opaque named blobs. The lifecycle manager only needs four
//! operations, so every backend (in-memory, file system, or a remote KV
//! store) implements the same narrow trait.
//!
//! Naming convention used by the lifecycle manager:
//! - `<thumbprint>.jwk` - active key
//! - `.<thumbprint>.jwk` - rotated key, kept for recovery

pub mod filesystem;
pub mod memory;

pub use filesystem::FileSystemStorage;
pub use memory::MemoryStorage;

use async_trait::async_trait;
use std::fmt::Debug;

/// Error type for storage operations
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Invalid key name: {0}")]
    InvalidName(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Backend error: {0}")]
    Backend(String),
}

/// Storage backend trait for Tang key material
///
/// Implementations must be thread-safe and support concurrent access.
/// A missing name is never an error: `get` returns `None` and `delete`
/// succeeds.
#[async_trait]
pub trait KeyStorage: Send + Sync + Debug {
    /// Read the content stored under `name`
    async fn get(&self, name: &str) -> Result<Option<String>, StorageError>;

    /// Create or overwrite `name`
    async fn put(&self, name: &str, value: &str) -> Result<(), StorageError>;

    /// Remove `name` if present
    async fn delete(&self, name: &str) -> Result<(), StorageError>;

    /// List every stored name
    async fn list(&self) -> Result<Vec<String>, StorageError>;
}
