//! Reverse-image price lookups.
//!
//! The backend holds the search engine key and calls the engine itself, so
//! browsers never see the key and never hit the engine cross-origin.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use thiserror::Error;

use crate::models::PriceComparisonResult;
use crate::pricing;

/// Search engine used for image lookups.
const LOOKUP_ENGINE: &str = "google_lens";

/// A lookup could not produce a payload.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("SerpAPI key not configured")]
    NotConfigured,
    #[error("lookup request failed: {0}")]
    Network(String),
    #[error("{message}")]
    Upstream { status: u16, message: String },
    #[error("lookup returned an unreadable payload: {0}")]
    InvalidPayload(String),
}

impl LookupError {
    /// HTTP status to relay when proxying this failure.
    pub fn status(&self) -> u16 {
        match self {
            LookupError::NotConfigured => 500,
            LookupError::Network(_) => 502,
            LookupError::Upstream { status, .. } => *status,
            LookupError::InvalidPayload(_) => 502,
        }
    }
}

/// Something that can search the web by image.
#[async_trait]
pub trait PriceLookup: Send + Sync {
    /// Return the raw search payload for an image.
    async fn search_by_image(&self, image_url: &str) -> Result<Value, LookupError>;
}

/// Client for the SerpAPI reverse-image engine.
pub struct SerpApiClient {
    inner: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl SerpApiClient {
    pub fn new(endpoint: String, api_key: Option<String>, timeout: Duration) -> Result<Self, LookupError> {
        let inner = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LookupError::Network(e.to_string()))?;

        Ok(Self {
            inner,
            endpoint,
            api_key,
        })
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

#[async_trait]
impl PriceLookup for SerpApiClient {
    async fn search_by_image(&self, image_url: &str) -> Result<Value, LookupError> {
        let api_key = self.api_key.as_deref().ok_or(LookupError::NotConfigured)?;

        tracing::info!("Searching for image: {}", image_url);

        let response = self
            .inner
            .get(&self.endpoint)
            .query(&[("engine", LOOKUP_ENGINE), ("url", image_url), ("api_key", api_key)])
            .send()
            .await
            .map_err(|e| LookupError::Network(e.to_string()))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| LookupError::Network(e.to_string()))?;
        let data: Option<Value> = serde_json::from_str(&body).ok();

        if !status.is_success() {
            let message = data
                .as_ref()
                .and_then(|d| d.get("error"))
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| format!("SerpAPI error: {}", status.as_u16()));
            tracing::warn!("SerpAPI error {}: {}", status, message);
            return Err(LookupError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        let data = data.ok_or_else(|| LookupError::InvalidPayload("body is not JSON".to_string()))?;
        let matches = data
            .get("visual_matches")
            .and_then(Value::as_array)
            .map(Vec::len)
            .unwrap_or(0);
        tracing::info!("SerpAPI success, found {} visual matches", matches);

        Ok(data)
    }
}

/// Look up an image and normalize the payload into a price comparison.
pub async fn compare_prices<L>(lookup: &L, image_url: &str) -> Result<PriceComparisonResult, LookupError>
where
    L: PriceLookup + ?Sized,
{
    let raw = lookup.search_by_image(image_url).await?;
    Ok(pricing::normalize(&raw))
}
