/// Cloudinary upload API
///
/// Uploads and destroys images with signed requests. Signatures are the
/// SHA-256 hex digest of the alphabetically sorted `key=value` parameters
/// joined by `&`, followed by the API secret.
use std::time::Duration;

use chrono::Utc;
use reqwest::{multipart, Client as HttpClient};
use serde::Deserialize;
use sha2::{Digest, Sha256};

use super::{extension_for, BlobStore, StoredBlob};
use crate::{
    config::CloudinaryCredentials,
    error::{AppError, AppResult},
};

const API_URL: &str = "https://api.cloudinary.com/v1_1";

#[derive(Debug, Deserialize)]
struct UploadResponse {
    public_id: String,
    secure_url: String,
}

#[derive(Debug, Deserialize)]
struct DestroyResponse {
    result: String,
}

#[derive(Clone)]
pub struct CloudinaryBlobStore {
    http_client: HttpClient,
    credentials: CloudinaryCredentials,
    api_url: String,
}

impl CloudinaryBlobStore {
    /// `timeout` bounds every upload and destroy request end to end
    pub fn new(credentials: CloudinaryCredentials, timeout: Duration) -> AppResult<Self> {
        let http_client = HttpClient::builder().timeout(timeout).build()?;

        Ok(Self {
            http_client,
            credentials,
            api_url: API_URL.to_string(),
        })
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into().trim_end_matches('/').to_string();
        self
    }

    fn endpoint(&self, action: &str) -> String {
        format!(
            "{}/{}/image/{}",
            self.api_url, self.credentials.cloud_name, action
        )
    }

    async fn check_status(response: reqwest::Response) -> AppResult<reqwest::Response> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "Cloudinary API returned status {}: {}",
                status, body
            )));
        }
        Ok(response)
    }
}

/// Signs request parameters for the Cloudinary API
pub fn sign_params(params: &[(&str, String)], api_secret: &str) -> String {
    let mut sorted: Vec<&(&str, String)> = params.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(&b.0));

    let to_sign = sorted
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha256::new();
    hasher.update(to_sign.as_bytes());
    hasher.update(api_secret.as_bytes());
    hex::encode(hasher.finalize())
}

#[async_trait::async_trait]
impl BlobStore for CloudinaryBlobStore {
    async fn put(&self, bytes: Vec<u8>, content_type: &str) -> AppResult<StoredBlob> {
        let timestamp = Utc::now().timestamp().to_string();
        let signature = sign_params(
            &[("timestamp", timestamp.clone())],
            &self.credentials.api_secret,
        );

        let file = multipart::Part::bytes(bytes)
            .file_name(format!("upload.{}", extension_for(content_type)))
            .mime_str(content_type)?;

        let form = multipart::Form::new()
            .part("file", file)
            .text("api_key", self.credentials.api_key.clone())
            .text("timestamp", timestamp)
            .text("signature", signature)
            .text("signature_algorithm", "sha256");

        let response = self
            .http_client
            .post(self.endpoint("upload"))
            .multipart(form)
            .send()
            .await?;
        let uploaded: UploadResponse = Self::check_status(response).await?.json().await?;

        tracing::info!(
            public_id = %uploaded.public_id,
            provider = "cloudinary",
            "Image uploaded"
        );

        Ok(StoredBlob {
            id: uploaded.public_id,
            url: uploaded.secure_url,
        })
    }

    async fn delete(&self, id: &str) -> AppResult<()> {
        let timestamp = Utc::now().timestamp().to_string();
        let signature = sign_params(
            &[("public_id", id.to_string()), ("timestamp", timestamp.clone())],
            &self.credentials.api_secret,
        );

        let response = self
            .http_client
            .post(self.endpoint("destroy"))
            .form(&[
                ("public_id", id),
                ("timestamp", timestamp.as_str()),
                ("api_key", self.credentials.api_key.as_str()),
                ("signature", signature.as_str()),
                ("signature_algorithm", "sha256"),
            ])
            .send()
            .await?;
        let destroyed: DestroyResponse = Self::check_status(response).await?.json().await?;

        match destroyed.result.as_str() {
            "ok" => Ok(()),
            "not found" => Err(AppError::NotFound(format!("Blob {} not found", id))),
            other => Err(AppError::ExternalApi(format!(
                "Cloudinary destroy returned {}",
                other
            ))),
        }
    }

    fn name(&self) -> &'static str {
        "cloudinary"
    }
}
