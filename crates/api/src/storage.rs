//! Attachment storage for absence justifications.
//!
//! Handlers only see the [`AttachmentStore`] trait. Records keep the storage
//! key; files are never served directly and are only read back through the
//! authenticated download endpoint.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use educ_core::types::DbId;
use sha2::{Digest, Sha256};

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid storage key '{0}'")]
    InvalidKey(String),

    #[error("Storage root '{0}' is not a directory")]
    NotADirectory(String),
}

/// Where justification attachments go.
#[async_trait]
pub trait AttachmentStore: Send + Sync {
    /// Store `bytes` under `key`, replacing any previous content.
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<(), StorageError>;

    /// Read back a stored attachment. `None` when nothing is stored there.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;

    /// Remove an attachment. Removing a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<(), StorageError>;

    /// Fail if the store cannot currently accept writes.
    async fn check(&self) -> Result<(), StorageError>;
}

/// Content-addressed key for a justification attachment.
///
/// `justifications/{attendance_id}-{first 16 hex chars of sha256}.{ext}`;
/// re-uploading the same file for the same record yields the same key.
pub fn justification_key(attendance_id: DbId, extension: &str, bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    let hex = format!("{digest:x}");
    format!("justifications/{attendance_id}-{}.{extension}", &hex[..16])
}

/// MIME type for a stored key, from its extension.
pub fn content_type_for(key: &str) -> &'static str {
    let extension = key.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase());
    match extension.as_deref() {
        Some("pdf") => "application/pdf",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}

/// Stores files below a root directory.
pub struct LocalAttachmentStore {
    root: PathBuf,
}

impl LocalAttachmentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, key: &str) -> Result<PathBuf, StorageError> {
        let relative = Path::new(key);
        let safe = !key.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !safe {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl AttachmentStore for LocalAttachmentStore {
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<(), StorageError> {
        let path = self.resolve(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, bytes).await?;
        tracing::debug!(path = %path.display(), size = bytes.len(), "Stored attachment");
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let path = self.resolve(key)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        let path = self.resolve(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                tracing::debug!(path = %path.display(), "Removed attachment");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn check(&self) -> Result<(), StorageError> {
        tokio::fs::create_dir_all(&self.root).await?;
        let metadata = tokio::fs::metadata(&self.root).await?;
        if !metadata.is_dir() {
            return Err(StorageError::NotADirectory(self.root.display().to_string()));
        }
        if metadata.permissions().readonly() {
            return Err(StorageError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "storage root is read-only",
            )));
        }
        Ok(())
    }
}
