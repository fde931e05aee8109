use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

use image::{codecs::jpeg::JpegEncoder, RgbImage};

use super::fetcher::ImageFetcher;
use super::layout::{render_grid, render_vertical, GridOptions, Layout, VerticalOptions, GRID_CAPACITY};
use crate::{
    error::{AppError, AppResult},
    services::blob::{BlobStore, StoredBlob},
};

pub const JPEG_QUALITY: u8 = 95;

#[derive(Debug, thiserror::Error)]
pub enum CompositeError {
    #[error("No image URLs provided")]
    NoImagesProvided,

    #[error("No images could be downloaded")]
    NoImagesAvailable,

    #[error("Failed to render composite: {0}")]
    Render(String),
}

/// Builds composite preview images from remote outfit photos
#[derive(Clone)]
pub struct CompositeService {
    fetcher: Arc<dyn ImageFetcher>,
    blobs: Arc<dyn BlobStore>,
    upload_timeout: Duration,
    grid: GridOptions,
    vertical: VerticalOptions,
}

impl CompositeService {
    pub fn new(
        fetcher: Arc<dyn ImageFetcher>,
        blobs: Arc<dyn BlobStore>,
        upload_timeout: Duration,
    ) -> Self {
        Self {
            fetcher,
            blobs,
            upload_timeout,
            grid: GridOptions::default(),
            vertical: VerticalOptions::default(),
        }
    }

    /// Fetches every URL and renders the successfully fetched images.
    ///
    /// Individual download failures are logged and skipped. Fails only when
    /// the list is empty or nothing could be fetched. Grid composites use the
    /// first four fetched images.
    pub async fn create_composite(
        &self,
        image_urls: &[String],
        layout: Layout,
    ) -> Result<RgbImage, CompositeError> {
        if image_urls.is_empty() {
            return Err(CompositeError::NoImagesProvided);
        }

        let mut images = self.fetch_all(image_urls).await;
        if images.is_empty() {
            return Err(CompositeError::NoImagesAvailable);
        }

        if layout == Layout::Grid {
            images.truncate(GRID_CAPACITY);
        }

        let grid = self.grid;
        let vertical = self.vertical;
        let count = images.len();

        let canvas = tokio::task::spawn_blocking(move || match layout {
            Layout::Grid => Ok(render_grid(&images, &grid)),
            Layout::Vertical => render_vertical(&images, &vertical),
        })
        .await
        .map_err(|e| CompositeError::Render(e.to_string()))?
        .map_err(|e| CompositeError::Render(e.to_string()))?;

        tracing::debug!(
            images = count,
            layout = ?layout,
            width = canvas.width(),
            height = canvas.height(),
            "Composite rendered"
        );

        Ok(canvas)
    }

    /// Renders a composite, encodes it as JPEG and uploads it to the blob store
    pub async fn create_and_upload(
        &self,
        image_urls: &[String],
        layout: Layout,
    ) -> AppResult<StoredBlob> {
        let canvas = self.create_composite(image_urls, layout).await?;

        let bytes = tokio::task::spawn_blocking(move || encode_jpeg(&canvas, JPEG_QUALITY))
            .await
            .map_err(|e| AppError::Internal(e.to_string()))??;

        let blob = tokio::time::timeout(self.upload_timeout, self.blobs.put(bytes, "image/jpeg"))
            .await
            .map_err(|_| {
                AppError::ExternalApi(format!(
                    "Composite upload to {} timed out after {}s",
                    self.blobs.name(),
                    self.upload_timeout.as_secs()
                ))
            })??;

        tracing::info!(blob_id = %blob.id, store = self.blobs.name(), "Composite uploaded");

        Ok(blob)
    }

    /// Fetches all URLs concurrently, keeping successful images in input order
    async fn fetch_all(&self, image_urls: &[String]) -> Vec<RgbImage> {
        let mut tasks = Vec::new();

        for url in image_urls {
            let fetcher = self.fetcher.clone();
            let url = url.clone();
            let task = tokio::spawn(async move { fetcher.fetch(&url).await });
            tasks.push(task);
        }

        let mut images = Vec::new();
        let mut error_count = 0;

        for task in tasks {
            match task.await {
                Ok(Ok(image)) => images.push(image),
                Ok(Err(e)) => {
                    tracing::warn!(url = %e.url, cause = %e.cause, "Skipping image that failed to download");
                    error_count += 1;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Image fetch task failed");
                    error_count += 1;
                }
            }
        }

        if error_count > 0 {
            tracing::warn!(
                success_count = images.len(),
                error_count = error_count,
                "Partial image fetch failure"
            );
        }

        images
    }
}

/// Encodes an RGB canvas as baseline JPEG
pub fn encode_jpeg(image: &RgbImage, quality: u8) -> Result<Vec<u8>, image::ImageError> {
    let mut buf = Cursor::new(Vec::new());
    JpegEncoder::new_with_quality(&mut buf, quality).encode_image(image)?;
    Ok(buf.into_inner())
}
