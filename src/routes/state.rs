use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::{
    config::Config,
    db::{
        create_pool, create_redis_client, Cache, CacheWriterHandle, DocumentStore,
        MemoryDocumentStore, OutfitRepository, PgDocumentStore, PlanStore, UserRepository,
    },
    services::{
        auth::SessionKeys,
        blob::{BlobStore, CloudinaryBlobStore, LocalBlobStore},
        imaging::{CompositeService, HttpImageFetcher, ImageFetcher},
        planner::WeeklyPlanner,
        providers::{ChatProvider, OpenAiChatProvider, WeatherApiProvider, WeatherProvider},
        tagging::{RandomTagger, Tagger, Taxonomy},
    },
};

const DEFAULT_UPLOAD_TIMEOUT: Duration = Duration::from_secs(30);

/// Shared application state, built once at startup
#[derive(Clone)]
pub struct AppState {
    pub outfits: OutfitRepository,
    pub plans: PlanStore,
    pub users: UserRepository,
    pub blobs: Arc<dyn BlobStore>,
    pub planner: WeeklyPlanner,
    pub tagger: Arc<dyn Tagger>,
    pub taxonomy: Arc<Taxonomy>,
    pub chat: Option<Arc<dyn ChatProvider>>,
    pub sessions: SessionKeys,
    pub cookie_secure: bool,
    /// Origin allowed for credentialed CORS requests
    pub cors_origin: Option<String>,
    /// Directory served at `/media` when blobs are stored locally
    pub media_dir: Option<PathBuf>,
}

impl AppState {
    pub fn builder(
        docs: Arc<dyn DocumentStore>,
        blobs: Arc<dyn BlobStore>,
        fetcher: Arc<dyn ImageFetcher>,
        sessions: SessionKeys,
    ) -> AppStateBuilder {
        AppStateBuilder {
            docs,
            blobs,
            fetcher,
            sessions,
            weather: None,
            chat: None,
            tagger: None,
            taxonomy: None,
            upload_timeout: DEFAULT_UPLOAD_TIMEOUT,
            cookie_secure: false,
            cors_origin: None,
            media_dir: None,
        }
    }

    /// Wires every collaborator from configuration.
    ///
    /// Returns the Redis writer handle when a cache is configured so that
    /// `main` can flush it on shutdown.
    pub async fn from_config(config: &Config) -> anyhow::Result<(Self, Option<CacheWriterHandle>)> {
        let docs: Arc<dyn DocumentStore> = match &config.database_url {
            Some(url) => {
                let pool = create_pool(url).await?;
                tracing::info!("Using PostgreSQL document store");
                Arc::new(PgDocumentStore::new(pool))
            }
            None => {
                tracing::warn!("DATABASE_URL not set, using in-memory document store");
                Arc::new(MemoryDocumentStore::new())
            }
        };

        let (cache, cache_handle) = match &config.redis_url {
            Some(url) => {
                let (cache, handle) = Cache::new(create_redis_client(url)?);
                (Some(cache), Some(handle))
            }
            None => (None, None),
        };

        let (blobs, media_dir): (Arc<dyn BlobStore>, Option<PathBuf>) = match config.cloudinary() {
            Some(credentials) => {
                tracing::info!(cloud = %credentials.cloud_name, "Using Cloudinary blob store");
                let store = CloudinaryBlobStore::new(credentials, config.blob_upload_timeout())?;
                (Arc::new(store), None)
            }
            None => {
                tracing::info!(dir = %config.media_dir.display(), "Using local blob store");
                let store = LocalBlobStore::new(&config.media_dir, &config.public_base_url);
                (Arc::new(store), Some(config.media_dir.clone()))
            }
        };

        let fetcher = Arc::new(HttpImageFetcher::new(config.image_fetch_timeout())?);

        let weather: Option<Arc<dyn WeatherProvider>> = match &config.weather_api_key {
            Some(key) => Some(Arc::new(WeatherApiProvider::new(
                key.clone(),
                config.weather_api_url.clone(),
                cache,
            )?)),
            None => {
                tracing::warn!("WEATHER_API_KEY not set, plans will have no weather");
                None
            }
        };

        let chat: Option<Arc<dyn ChatProvider>> = match &config.openai_api_key {
            Some(key) => Some(Arc::new(OpenAiChatProvider::new(
                key.clone(),
                config.openai_api_url.clone(),
                config.chat_model.clone(),
            )?)),
            None => None,
        };

        let taxonomy = match &config.tags_dir {
            Some(dir) => Taxonomy::load(dir)?,
            None => Taxonomy::builtin()?,
        };

        let mut builder = Self::builder(
            docs,
            blobs,
            fetcher,
            SessionKeys::new(&config.jwt_secret, config.session_timeout_seconds),
        )
        .with_taxonomy(taxonomy)
        .with_upload_timeout(config.blob_upload_timeout())
        .with_cookie_secure(config.cookie_secure)
        .with_cors_origin(config.cors_origin.clone());

        if let Some(weather) = weather {
            builder = builder.with_weather(weather);
        }
        if let Some(chat) = chat {
            builder = builder.with_chat(chat);
        }
        if let Some(dir) = media_dir {
            builder = builder.with_media_dir(dir);
        }

        Ok((builder.build()?, cache_handle))
    }
}

pub struct AppStateBuilder {
    docs: Arc<dyn DocumentStore>,
    blobs: Arc<dyn BlobStore>,
    fetcher: Arc<dyn ImageFetcher>,
    sessions: SessionKeys,
    weather: Option<Arc<dyn WeatherProvider>>,
    chat: Option<Arc<dyn ChatProvider>>,
    tagger: Option<Arc<dyn Tagger>>,
    taxonomy: Option<Taxonomy>,
    upload_timeout: Duration,
    cookie_secure: bool,
    cors_origin: Option<String>,
    media_dir: Option<PathBuf>,
}

impl AppStateBuilder {
    pub fn with_weather(mut self, weather: Arc<dyn WeatherProvider>) -> Self {
        self.weather = Some(weather);
        self
    }

    pub fn with_chat(mut self, chat: Arc<dyn ChatProvider>) -> Self {
        self.chat = Some(chat);
        self
    }

    pub fn with_tagger(mut self, tagger: Arc<dyn Tagger>) -> Self {
        self.tagger = Some(tagger);
        self
    }

    pub fn with_taxonomy(mut self, taxonomy: Taxonomy) -> Self {
        self.taxonomy = Some(taxonomy);
        self
    }

    pub fn with_upload_timeout(mut self, timeout: Duration) -> Self {
        self.upload_timeout = timeout;
        self
    }

    pub fn with_cookie_secure(mut self, secure: bool) -> Self {
        self.cookie_secure = secure;
        self
    }

    pub fn with_cors_origin(mut self, origin: impl Into<String>) -> Self {
        self.cors_origin = Some(origin.into());
        self
    }

    pub fn with_media_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.media_dir = Some(dir.into());
        self
    }

    /// Defaults to the random tagger and the bundled taxonomy
    pub fn build(self) -> anyhow::Result<AppState> {
        let taxonomy = match self.taxonomy {
            Some(taxonomy) => taxonomy,
            None => Taxonomy::builtin()?,
        };

        let composites =
            CompositeService::new(self.fetcher, self.blobs.clone(), self.upload_timeout);

        Ok(AppState {
            outfits: OutfitRepository::new(self.docs.clone()),
            plans: PlanStore::new(self.docs.clone()),
            users: UserRepository::new(self.docs),
            blobs: self.blobs,
            planner: WeeklyPlanner::new(composites, self.weather),
            tagger: self.tagger.unwrap_or_else(|| Arc::new(RandomTagger)),
            taxonomy: Arc::new(taxonomy),
            chat: self.chat,
            sessions: self.sessions,
            cookie_secure: self.cookie_secure,
            cors_origin: self.cors_origin,
            media_dir: self.media_dir,
        })
    }
}
