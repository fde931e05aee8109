//! Blob storage for uploaded photos and rendered composites.
//!
//! Two backends share the `BlobStore` trait: Cloudinary for deployments and a
//! local media directory (served by this process) for development.
use serde::{Deserialize, Serialize};

use crate::error::AppResult;

pub mod cloudinary;
pub mod local;

pub use cloudinary::CloudinaryBlobStore;
pub use local::LocalBlobStore;

/// Location of a stored blob
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredBlob {
    /// Backend identifier, used for deletion
    pub id: String,
    /// Publicly reachable URL
    pub url: String,
}

#[async_trait::async_trait]
pub trait BlobStore: Send + Sync {
    async fn put(&self, bytes: Vec<u8>, content_type: &str) -> AppResult<StoredBlob>;

    async fn delete(&self, id: &str) -> AppResult<()>;

    /// Backend name for logging
    fn name(&self) -> &'static str;
}

/// File extension for an image content type
pub fn extension_for(content_type: &str) -> &'static str {
    match content_type {
        "image/jpeg" | "image/jpg" => "jpg",
        "image/png" => "png",
        "image/webp" => "webp",
        "image/gif" => "gif",
        "image/bmp" => "bmp",
        "image/tiff" => "tiff",
        _ => "bin",
    }
}
