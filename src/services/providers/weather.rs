/// WeatherAPI.com forecast provider
///
/// Uses `/forecast.json?key=..&q=lat,lon&days=N` and keeps only the daily
/// average temperature and condition.
use std::time::Duration;

use chrono::Utc;
use reqwest::Client as HttpClient;

use crate::{
    cached,
    db::{Cache, CacheKey},
    error::{AppError, AppResult},
    models::{weather::WeatherApiResponse, ForecastDay},
};

const FORECAST_CACHE_TTL: u64 = 3600; // 1 hour
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait WeatherProvider: Send + Sync {
    /// Daily forecast starting today, at most `days` entries
    async fn forecast(&self, latitude: f64, longitude: f64, days: usize)
        -> AppResult<Vec<ForecastDay>>;

    /// Provider name for logging
    fn name(&self) -> &'static str;
}

#[derive(Clone)]
pub struct WeatherApiProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    cache: Option<Cache>,
}

impl WeatherApiProvider {
    pub fn new(api_key: String, api_url: String, cache: Option<Cache>) -> AppResult<Self> {
        let http_client = HttpClient::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self {
            http_client,
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
            cache,
        })
    }

    async fn fetch_forecast(
        &self,
        latitude: f64,
        longitude: f64,
        days: usize,
    ) -> AppResult<Vec<ForecastDay>> {
        let url = format!("{}/forecast.json", self.api_url);
        let location = format!("{},{}", latitude, longitude);
        let days_param = days.to_string();

        let response = self
            .http_client
            .get(&url)
            .query(&[
                ("key", self.api_key.as_str()),
                ("q", location.as_str()),
                ("days", days_param.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "WeatherAPI returned status {}: {}",
                status, body
            )));
        }

        let body: WeatherApiResponse = response.json().await?;
        let forecast: Vec<ForecastDay> = body
            .forecast
            .forecastday
            .into_iter()
            .take(days)
            .map(ForecastDay::from)
            .collect();

        tracing::info!(
            location = %location,
            days = forecast.len(),
            provider = "weatherapi",
            "Forecast fetched"
        );

        Ok(forecast)
    }
}

/// Coordinates rounded to ~1km so nearby requests share a cache entry
fn location_key(latitude: f64, longitude: f64) -> String {
    format!("{:.2},{:.2}", latitude, longitude)
}

#[async_trait::async_trait]
impl WeatherProvider for WeatherApiProvider {
    async fn forecast(
        &self,
        latitude: f64,
        longitude: f64,
        days: usize,
    ) -> AppResult<Vec<ForecastDay>> {
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(AppError::InvalidInput(format!(
                "Coordinates out of range: {}, {}",
                latitude, longitude
            )));
        }

        match &self.cache {
            Some(cache) => {
                let key = CacheKey::Forecast {
                    location: location_key(latitude, longitude),
                    start: Utc::now().date_naive(),
                    days,
                };
                cached!(
                    cache,
                    key,
                    FORECAST_CACHE_TTL,
                    self.fetch_forecast(latitude, longitude, days)
                )
            }
            None => self.fetch_forecast(latitude, longitude, days).await,
        }
    }

    fn name(&self) -> &'static str {
        "weatherapi"
    }
}
