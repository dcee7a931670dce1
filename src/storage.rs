//! Object storage for gallery uploads.

use async_trait::async_trait;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid object name: {0}")]
    InvalidName(String),
}

#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Store `bytes` under `name` and return the public URL.
    async fn upload(&self, bytes: &[u8], name: &str) -> Result<String, StorageError>;
    async fn remove(&self, name: &str) -> Result<(), StorageError>;
}

/// Writes objects under a local directory served statically by the app.
pub struct LocalDiskStorage {
    root: PathBuf,
    public_base: String,
}

impl LocalDiskStorage {
    pub fn new(root: impl Into<PathBuf>, public_base: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base: public_base.into(),
        }
    }

    fn checked_path(&self, name: &str) -> Result<PathBuf, StorageError> {
        // Generated names are flat; anything with a path separator is refused.
        if name.is_empty() || name.contains('/') || name.contains('\\') || name.contains("..") {
            return Err(StorageError::InvalidName(name.to_string()));
        }
        Ok(self.root.join(name))
    }
}

#[async_trait]
impl ObjectStorage for LocalDiskStorage {
    async fn upload(&self, bytes: &[u8], name: &str) -> Result<String, StorageError> {
        let path = self.checked_path(name)?;
        tokio::fs::create_dir_all(&self.root).await?;
        tokio::fs::write(&path, bytes).await?;
        Ok(format!(
            "{}/{}",
            self.public_base.trim_end_matches('/'),
            name
        ))
    }

    async fn remove(&self, name: &str) -> Result<(), StorageError> {
        let path = self.checked_path(name)?;
        tokio::fs::remove_file(&path).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_traversal_names() {
        let storage = LocalDiskStorage::new("/tmp/uploads", "/uploads");
        assert!(storage.checked_path("../etc/passwd").is_err());
        assert!(storage.checked_path("a/b.jpg").is_err());
        assert!(storage.checked_path("").is_err());
        assert!(storage.checked_path("image.jpg").is_ok());
    }
}
