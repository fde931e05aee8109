use std::time::Duration;

use image::RgbImage;
use reqwest::Client as HttpClient;

use crate::error::{AppError, AppResult};

/// A single image download that failed
#[derive(Debug, Clone, thiserror::Error)]
#[error("Failed to download image from {url}: {cause}")]
pub struct FetchError {
    pub url: String,
    pub cause: String,
}

impl FetchError {
    fn new(url: &str, cause: impl ToString) -> Self {
        Self {
            url: url.to_string(),
            cause: cause.to_string(),
        }
    }
}

/// Source of decoded RGB images addressed by URL
#[async_trait::async_trait]
pub trait ImageFetcher: Send + Sync {
    /// Downloads and decodes one image. No retries.
    async fn fetch(&self, url: &str) -> Result<RgbImage, FetchError>;
}

/// Fetches images over HTTP with a bounded timeout
#[derive(Clone)]
pub struct HttpImageFetcher {
    http_client: HttpClient,
}

impl HttpImageFetcher {
    pub fn new(timeout: Duration) -> AppResult<Self> {
        let http_client = HttpClient::builder().timeout(timeout).build()?;
        Ok(Self { http_client })
    }
}

#[async_trait::async_trait]
impl ImageFetcher for HttpImageFetcher {
    async fn fetch(&self, url: &str) -> Result<RgbImage, FetchError> {
        tracing::debug!(url = %url, "Fetching image");

        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::new(url, e))?;

        if !response.status().is_success() {
            return Err(FetchError::new(
                url,
                format!("HTTP status {}", response.status()),
            ));
        }

        let bytes = response.bytes().await.map_err(|e| FetchError::new(url, e))?;

        let image = tokio::task::spawn_blocking(move || decode_rgb(&bytes))
            .await
            .map_err(|e| FetchError::new(url, e))?
            .map_err(|e| FetchError::new(url, e))?;

        tracing::debug!(
            url = %url,
            width = image.width(),
            height = image.height(),
            "Image fetched"
        );

        Ok(image)
    }
}

/// Decodes any supported format and normalizes it to 8-bit RGB.
///
/// Indexed, grayscale and alpha formats are converted; alpha is dropped.
pub fn decode_rgb(bytes: &[u8]) -> Result<RgbImage, image::ImageError> {
    Ok(image::load_from_memory(bytes)?.to_rgb8())
}

/// Decodes uploaded image bytes, reporting undecodable data as a client error
pub fn decode_upload(bytes: &[u8]) -> AppResult<image::DynamicImage> {
    image::load_from_memory(bytes)
        .map_err(|e| AppError::InvalidInput(format!("Could not decode image: {}", e)))
}
