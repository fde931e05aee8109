use std::path::PathBuf;

use uuid::Uuid;

use super::{extension_for, BlobStore, StoredBlob};
use crate::error::{AppError, AppResult};

/// Stores blobs as files under a media directory, served at `{base_url}/media/{id}`
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    root: PathBuf,
    base_url: String,
}

impl LocalBlobStore {
    pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn path_for(&self, id: &str) -> AppResult<PathBuf> {
        if id.is_empty() || id.contains(|c: char| c == '/' || c == '\\') || id.contains("..") {
            return Err(AppError::InvalidInput(format!("Invalid blob id: {}", id)));
        }
        Ok(self.root.join(id))
    }
}

#[async_trait::async_trait]
impl BlobStore for LocalBlobStore {
    async fn put(&self, bytes: Vec<u8>, content_type: &str) -> AppResult<StoredBlob> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to create media dir: {}", e)))?;

        let id = format!("{}.{}", Uuid::new_v4(), extension_for(content_type));
        let path = self.path_for(&id)?;
        let size = bytes.len();

        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to write blob: {}", e)))?;

        tracing::debug!(blob_id = %id, bytes = size, "Stored blob locally");

        Ok(StoredBlob {
            url: format!("{}/media/{}", self.base_url, id),
            id,
        })
    }

    async fn delete(&self, id: &str) -> AppResult<()> {
        let path = self.path_for(id)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(AppError::NotFound(format!("Blob {} not found", id)))
            }
            Err(e) => Err(AppError::Internal(format!("Failed to delete blob: {}", e))),
        }
    }

    fn name(&self) -> &'static str {
        "local"
    }
}
