//! Image search backend
//!
//! [`ImageSearch`] is the one operation the resolver needs: search photos by
//! a free-text query. [`UnsplashClient`] implements it against the Unsplash
//! `search/photos` endpoint.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use crate::config::{ImagesConfig, UNSPLASH_ACCESS_KEY_VAR};
use crate::{Result, TripPlannerError};

/// Orientation and paging hints sent with a search
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOptions {
    pub orientation: String,
    pub per_page: u32,
}

impl From<&ImagesConfig> for SearchOptions {
    fn from(config: &ImagesConfig) -> Self {
        Self {
            orientation: config.orientation.clone(),
            per_page: config.per_page,
        }
    }
}

/// A ranked search hit
#[derive(Debug, Clone, PartialEq)]
pub struct PhotoHit {
    pub url: String,
    pub description: Option<String>,
}

/// Anything that can search photos by query
#[async_trait]
pub trait ImageSearch: Send + Sync {
    async fn search_photos(&self, query: &str, options: &SearchOptions) -> Result<Vec<PhotoHit>>;
}

/// Unsplash photo search client
pub struct UnsplashClient {
    client: Client,
    access_key: Option<String>,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<UnsplashPhoto>,
}

#[derive(Debug, Deserialize)]
struct UnsplashPhoto {
    urls: UnsplashUrls,
    alt_description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UnsplashUrls {
    regular: String,
}

impl UnsplashClient {
    /// Create a new client
    pub fn new(config: &ImagesConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("TripPlanner/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TripPlannerError::api(format!("Failed to create HTTP client: {e}")))?;

        if config.api_key.is_none() {
            warn!(
                "No image search key configured ({}); every stop will use a placeholder image",
                UNSPLASH_ACCESS_KEY_VAR
            );
        }

        Ok(Self {
            client,
            access_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl ImageSearch for UnsplashClient {
    #[instrument(name = "unsplash_search", skip(self, options))]
    async fn search_photos(&self, query: &str, options: &SearchOptions) -> Result<Vec<PhotoHit>> {
        let access_key = self.access_key.as_deref().ok_or_else(|| {
            TripPlannerError::config(format!(
                "Image search key is missing. Set {UNSPLASH_ACCESS_KEY_VAR} or images.api_key"
            ))
        })?;

        let url = format!("{}/search/photos", self.base_url);
        let per_page = options.per_page.to_string();

        let response = self
            .client
            .get(&url)
            .query(&[
                ("query", query),
                ("per_page", per_page.as_str()),
                ("orientation", options.orientation.as_str()),
            ])
            .header("Authorization", format!("Client-ID {access_key}"))
            .header("Accept-Version", "v1")
            .send()
            .await
            .map_err(|e| TripPlannerError::api(format!("Image search request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();

            return Err(match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => TripPlannerError::config(
                    format!("Image search rejected the configured key ({status})"),
                ),
                StatusCode::TOO_MANY_REQUESTS => {
                    TripPlannerError::api("Image search rate limit exceeded")
                }
                _ => TripPlannerError::api(format!("Image search error {status}: {error_text}")),
            });
        }

        let search: SearchResponse = response
            .json()
            .await
            .map_err(|e| TripPlannerError::api(format!("Failed to parse image search response: {e}")))?;

        let hits: Vec<PhotoHit> = search
            .results
            .into_iter()
            .map(|photo| PhotoHit {
                url: photo.urls.regular,
                description: photo.alt_description,
            })
            .collect();

        debug!("Image search returned {} hits", hits.len());
        Ok(hits)
    }
}
