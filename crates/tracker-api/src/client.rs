//! Tracking service client.
//!
//! Each call is a single rate-limited attempt: failures surface immediately
//! to the caller, which decides whether the user retries.

use crate::error::ApiError;
use crate::rate_limiter::RateLimiter;
use crate::types::{DataResponse, LibraryEntryRequest, ResourceItem, SingleResponse};
use anyhow::{Context, Result};
use futures::future::BoxFuture;
use reqwest::Client;
use serde::de::DeserializeOwned;
use shared::api::{LibraryApi, SearchApi};
use shared::models::{SeriesModel, SeriesType};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Client for the catalogue/tracking service
#[derive(Clone)]
pub struct TrackerClient {
    /// HTTP client
    client: Client,
    /// Base URL for the service
    base_url: String,
    /// Shared rate limiter
    rate_limiter: Arc<Mutex<RateLimiter>>,
}

impl TrackerClient {
    /// Create a new client
    pub fn new(base_url: String, requests_per_second: f64, requests_per_minute: u32) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("nekome/0.1.0")
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url,
            rate_limiter: Arc::new(Mutex::new(RateLimiter::new(
                requests_per_second,
                requests_per_minute,
            ))),
        })
    }

    /// Execute a request: one attempt, rate limited, status checked
    async fn execute<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        self.rate_limiter.lock().await.acquire().await;

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            warn!(status = %status, message = %message, "Request failed");
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    fn path_for(series_type: SeriesType) -> Result<&'static str, ApiError> {
        match series_type {
            SeriesType::Anime => Ok("anime"),
            SeriesType::Manga => Ok("manga"),
            SeriesType::Unknown => Err(ApiError::UnsupportedType),
        }
    }

    /// Search the catalogue for series matching the given text
    pub async fn search(
        &self,
        text: &str,
        series_type: SeriesType,
    ) -> Result<Vec<SeriesModel>, ApiError> {
        let path = Self::path_for(series_type)?;
        let url = format!("{}/{}", self.base_url, path);

        debug!(url = %url, text = text, "Searching catalogue");

        let response: DataResponse<ResourceItem> = self
            .execute(self.client.get(&url).query(&[("filter[text]", text)]))
            .await?;

        debug!(count = response.data.len(), "Search request successful");

        response
            .data
            .into_iter()
            .map(ResourceItem::into_series_model)
            .collect()
    }

    /// Push a new library entry; returns the server-confirmed series
    pub async fn push_library_entry(&self, series: &SeriesModel) -> Result<SeriesModel, ApiError> {
        // Reject the sentinel before going to the wire
        Self::path_for(series.series_type)?;

        let url = format!("{}/library-entries", self.base_url);
        let body = LibraryEntryRequest::for_series(series);

        debug!(url = %url, id = series.id, "Pushing library entry");

        let response: SingleResponse<ResourceItem> =
            self.execute(self.client.post(&url).json(&body)).await?;

        let mut confirmed = response.data.into_series_model()?;
        // The resource echo carries no user state; keep what was requested
        confirmed.user_status = series.user_status;
        confirmed.progress = series.progress;
        Ok(confirmed)
    }
}

impl SearchApi for TrackerClient {
    fn search_for_series_with(
        &self,
        text: &str,
        series_type: SeriesType,
    ) -> BoxFuture<'static, Result<Vec<SeriesModel>>> {
        let client = self.clone();
        let text = text.to_owned();
        Box::pin(async move { Ok(client.search(&text, series_type).await?) })
    }
}

impl LibraryApi for TrackerClient {
    fn send_new_to_api(&self, series: &SeriesModel) -> BoxFuture<'static, Result<SeriesModel>> {
        let client = self.clone();
        let series = series.clone();
        Box::pin(async move { Ok(client.push_library_entry(&series).await?) })
    }
}
