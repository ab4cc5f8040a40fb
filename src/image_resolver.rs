//! Image resolution with an in-memory lookup cache
//!
//! Every lookup ends in a usable URL: a cached one, the first search hit, or a
//! deterministic placeholder derived from the query. Errors from the search
//! backend are logged and never reach the caller.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::ImagesConfig;
use crate::images::{ImageSearch, SearchOptions};
use crate::models::DayPlan;

/// Liveness flag owned by the view that asked for images
///
/// Closing the handle does not abort in-flight lookups; it only stops their
/// results from being handed back to a view that no longer exists.
#[derive(Debug, Clone)]
pub struct ViewHandle {
    alive: Arc<AtomicBool>,
}

impl ViewHandle {
    #[must_use]
    pub fn new() -> Self {
        Self {
            alive: Arc::new(AtomicBool::new(true)),
        }
    }

    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }

    pub fn close(&self) {
        self.alive.store(false, Ordering::Release);
    }
}

impl Default for ViewHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolves place names to photo URLs, caching every answer for its lifetime
pub struct ImageResolver {
    search: Arc<dyn ImageSearch>,
    options: SearchOptions,
    placeholder_base_url: String,
    prefetch_delay: Duration,
    cache: RwLock<HashMap<String, String>>,
}

/// Cache keys are case-insensitive place names
fn normalize_key(key: &str) -> String {
    key.trim().to_lowercase()
}

impl ImageResolver {
    /// Create a resolver over an image search backend
    pub fn new(search: Arc<dyn ImageSearch>, config: &ImagesConfig) -> Self {
        Self {
            search,
            options: SearchOptions::from(config),
            placeholder_base_url: config.placeholder_base_url.trim_end_matches('/').to_string(),
            prefetch_delay: config.prefetch_delay(),
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Deterministic stand-in image for a query
    #[must_use]
    pub fn placeholder_url(&self, query: &str) -> String {
        format!(
            "{}/800x600/?{}",
            self.placeholder_base_url,
            urlencoding::encode(query.trim())
        )
    }

    /// Cached URL for a key, if any
    #[must_use]
    pub fn cached(&self, key: &str) -> Option<String> {
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&normalize_key(key))
            .cloned()
    }

    /// Number of cached entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.cache.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn store(&self, key: String, url: String) {
        self.cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, url);
    }

    /// Resolve a photo URL for `key`, searching with `query` on a cache miss
    pub async fn resolve(&self, key: &str, query: &str) -> String {
        self.resolve_tracked(key, query).await.0
    }

    /// Like [`resolve`](Self::resolve), also reporting whether the cache answered
    async fn resolve_tracked(&self, key: &str, query: &str) -> (String, bool) {
        let key = normalize_key(key);
        if let Some(url) = self.cached(&key) {
            debug!("Image cache hit for '{}'", key);
            return (url, true);
        }

        let url = match self.search.search_photos(query, &self.options).await {
            Ok(hits) => match hits.into_iter().next() {
                Some(hit) => hit.url,
                None => {
                    debug!("No image results for '{}', using placeholder", query);
                    self.placeholder_url(query)
                }
            },
            Err(e) => {
                warn!("Image search failed for '{}': {}", query, e);
                self.placeholder_url(query)
            }
        };

        self.store(key, url.clone());
        (url, false)
    }

    /// Resolve images for every stop of a day, in order
    ///
    /// Returns `None` once `view` has been closed; lookups already started
    /// still land in the cache.
    pub async fn prefetch_day(
        &self,
        destination: &str,
        day: &DayPlan,
        view: &ViewHandle,
    ) -> Option<HashMap<String, String>> {
        let mut images = HashMap::with_capacity(day.stops.len());
        let mut fetched_any = false;

        for stop in &day.stops {
            if !view.is_alive() {
                debug!("View closed, dropping remaining prefetch for '{}'", day.title);
                return None;
            }

            let key = normalize_key(&stop.name);
            if images.contains_key(&key) {
                continue;
            }

            if fetched_any && self.cached(&key).is_none() && !self.prefetch_delay.is_zero() {
                tokio::time::sleep(self.prefetch_delay).await;
            }

            let query = format!("{} {}", stop.name.trim(), destination.trim());
            let (url, from_cache) = self.resolve_tracked(&key, &query).await;
            fetched_any |= !from_cache;
            images.insert(key, url);
        }

        if !view.is_alive() {
            return None;
        }

        info!("Prefetched {} images for '{}'", images.len(), day.title);
        Some(images)
    }
}
