use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// PostgreSQL connection URL; the in-memory document store is used when unset
    #[serde(default)]
    pub database_url: Option<String>,

    /// Redis connection URL for the forecast cache
    #[serde(default)]
    pub redis_url: Option<String>,

    /// Secret used to sign session tokens
    pub jwt_secret: String,

    /// Session lifetime in seconds
    #[serde(default = "default_session_timeout")]
    pub session_timeout_seconds: u64,

    /// Whether the auth cookie is marked `Secure`
    #[serde(default)]
    pub cookie_secure: bool,

    #[serde(default)]
    pub cloudinary_cloud_name: Option<String>,
    #[serde(default)]
    pub cloudinary_api_key: Option<String>,
    #[serde(default)]
    pub cloudinary_api_secret: Option<String>,

    /// Directory for locally stored media when Cloudinary is not configured
    #[serde(default = "default_media_dir")]
    pub media_dir: PathBuf,

    /// Externally visible base URL of this server
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,

    #[serde(default)]
    pub weather_api_key: Option<String>,

    #[serde(default = "default_weather_api_url")]
    pub weather_api_url: String,

    #[serde(default)]
    pub openai_api_key: Option<String>,

    #[serde(default = "default_openai_api_url")]
    pub openai_api_url: String,

    #[serde(default = "default_chat_model")]
    pub chat_model: String,

    /// Timeout for downloading a single source image
    #[serde(default = "default_image_fetch_timeout")]
    pub image_fetch_timeout_secs: u64,

    /// Timeout for uploading a rendered composite
    #[serde(default = "default_blob_upload_timeout")]
    pub blob_upload_timeout_secs: u64,

    /// Origin allowed to make credentialed cross-origin requests
    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,

    /// Override directory for the tag taxonomy JSON files
    #[serde(default)]
    pub tags_dir: Option<PathBuf>,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Cloudinary credentials, present only when all three keys are set
#[derive(Debug, Clone)]
pub struct CloudinaryCredentials {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
}

fn default_session_timeout() -> u64 {
    3600
}

fn default_media_dir() -> PathBuf {
    PathBuf::from("./media")
}

fn default_public_base_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_weather_api_url() -> String {
    "https://api.weatherapi.com/v1".to_string()
}

fn default_openai_api_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_chat_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_image_fetch_timeout() -> u64 {
    10
}

fn default_blob_upload_timeout() -> u64 {
    30
}

fn default_cors_origin() -> String {
    "http://localhost:3000".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    pub fn cloudinary(&self) -> Option<CloudinaryCredentials> {
        match (
            &self.cloudinary_cloud_name,
            &self.cloudinary_api_key,
            &self.cloudinary_api_secret,
        ) {
            (Some(cloud_name), Some(api_key), Some(api_secret)) => Some(CloudinaryCredentials {
                cloud_name: cloud_name.clone(),
                api_key: api_key.clone(),
                api_secret: api_secret.clone(),
            }),
            _ => None,
        }
    }

    pub fn image_fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.image_fetch_timeout_secs)
    }

    pub fn blob_upload_timeout(&self) -> Duration {
        Duration::from_secs(self.blob_upload_timeout_secs)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
