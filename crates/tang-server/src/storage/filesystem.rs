//! File system storage backend
//!
//! One file per key in a single directory, the same layout the reference
//! Tang daemon uses (`/var/db/tang/<thp>.jwk`, rotated keys hidden with a
//! leading dot), so an existing key database can be served as-is.
//!
//! Writes go to a temporary file that is then renamed over the target, so
//! a crash never leaves a truncated JWK behind.

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use super::{KeyStorage, StorageError};

/// Suffix of every file this backend lists
const JWK_SUFFIX: &str = ".jwk";

/// Directory-backed key store
#[derive(Debug, Clone)]
pub struct FileSystemStorage {
    dir: PathBuf,
}

impl FileSystemStorage {
    /// Use `dir` as the key database. The directory is not created.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Use `dir` as the key database, creating it if needed
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let storage = Self::new(dir);
        fs::create_dir_all(&storage.dir).await?;
        info!(dir = %storage.dir.display(), "Opened file system key storage");
        Ok(storage)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Resolve a key name to a path inside the directory.
    ///
    /// Names are single path components: no separators, no `..`, no NUL.
    fn path_for(&self, name: &str) -> Result<PathBuf, StorageError> {
        let invalid = name.is_empty()
            || name.contains('\0')
            || name.contains("..")
            || name.contains('/')
            || name.contains('\\');
        if invalid {
            return Err(StorageError::InvalidName(name.to_string()));
        }
        Ok(self.dir.join(name))
    }
}

#[async_trait]
impl KeyStorage for FileSystemStorage {
    async fn get(&self, name: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(name)?;
        match fs::read_to_string(&path).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn put(&self, name: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(name)?;
        let tmp = self.path_for(&format!("{}.tmp", name))?;

        let mut options = fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        options.mode(0o600);

        let mut file = options.open(&tmp).await?;
        file.write_all(value.as_bytes()).await?;
        file.sync_all().await?;
        drop(file);

        fs::rename(&tmp, &path).await?;
        debug!(path = %path.display(), "Wrote key file");
        Ok(())
    }

    async fn delete(&self, name: &str) -> Result<(), StorageError> {
        let path = self.path_for(name)?;
        match fs::remove_file(&path).await {
            Ok(()) => {
                debug!(path = %path.display(), "Removed key file");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn list(&self) -> Result<Vec<String>, StorageError> {
        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if let Some(name) = entry.file_name().to_str() {
                if name.ends_with(JWK_SUFFIX) {
                    names.push(name.to_string());
                }
            }
        }
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::contract;
    use tempfile::TempDir;

    fn storage() -> (TempDir, FileSystemStorage) {
        let dir = TempDir::new().unwrap();
        let storage = FileSystemStorage::new(dir.path());
        (dir, storage)
    }

    #[tokio::test]
    async fn test_put_and_get() {
        let (_dir, storage) = storage();
        contract::put_and_get(&storage).await;
    }

    #[tokio::test]
    async fn test_missing_is_none() {
        let (_dir, storage) = storage();
        contract::missing_is_none(&storage).await;
    }

    #[tokio::test]
    async fn test_put_overwrites() {
        let (_dir, storage) = storage();
        contract::put_overwrites(&storage).await;
    }

    #[tokio::test]
    async fn test_delete_removes() {
        let (_dir, storage) = storage();
        contract::delete_removes(&storage).await;
    }

    #[tokio::test]
    async fn test_list_returns_names() {
        let (_dir, storage) = storage();
        contract::list_returns_names(&storage).await;
    }

    #[tokio::test]
    async fn test_list_ignores_other_files() {
        let (dir, storage) = storage();
        std::fs::write(dir.path().join("notes.txt"), "hello").unwrap();
        std::fs::write(dir.path().join("abc.jwk.tmp"), "partial").unwrap();
        storage.put("abc.jwk", "{}").await.unwrap();

        assert_eq!(storage.list().await.unwrap(), vec!["abc.jwk".to_string()]);
    }

    #[tokio::test]
    async fn test_missing_directory_lists_empty() {
        let dir = TempDir::new().unwrap();
        let storage = FileSystemStorage::new(dir.path().join("does-not-exist"));
        assert!(storage.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_open_creates_directory() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a").join("b");
        let storage = FileSystemStorage::open(&nested).await.unwrap();

        assert!(nested.is_dir());
        storage.put("k.jwk", "v").await.unwrap();
        assert!(nested.join("k.jwk").is_file());
    }

    #[tokio::test]
    async fn test_rejects_path_traversal() {
        let (_dir, storage) = storage();

        for name in ["../escape.jwk", "a/b.jwk", "..", "", "nul\0.jwk", "a\\b.jwk"] {
            assert!(matches!(
                storage.put(name, "x").await,
                Err(StorageError::InvalidName(_))
            ));
            assert!(matches!(
                storage.get(name).await,
                Err(StorageError::InvalidName(_))
            ));
            assert!(matches!(
                storage.delete(name).await,
                Err(StorageError::InvalidName(_))
            ));
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_key_files_are_private() {
        use std::os::unix::fs::PermissionsExt;

        let (dir, storage) = storage();
        storage.put("secret.jwk", "{}").await.unwrap();

        let mode = std::fs::metadata(dir.path().join("secret.jwk"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
