//! TTL-cached access to the catalog category tree.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;

use crate::models::{CategoryIndex, TaxonomyPayload};

use super::client::{CatalogError, ResilientClient};

const TAXONOMY_CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// A cached value with its fetch time; valid while `fetched_at + ttl` is in
/// the future. A stale entry is never returned while a refresh can replace
/// it, but it is retained as the fallback for failed refreshes.
struct CacheEntry<T> {
    value: T,
    fetched_at: Instant,
    ttl: Duration,
}

impl<T> CacheEntry<T> {
    fn new(value: T, ttl: Duration) -> Self {
        Self {
            value,
            fetched_at: Instant::now(),
            ttl,
        }
    }

    fn is_fresh(&self) -> bool {
        self.fetched_at.elapsed() < self.ttl
    }
}

/// Fetches and caches the category tree per application id.
///
/// Never errors to its caller: a failed refresh serves the previous entry
/// if one exists, else an empty index, and logs a warning.
pub struct TaxonomyCache {
    client: Arc<ResilientClient>,
    endpoint: String,
    ttl: Duration,
    entries: RwLock<HashMap<String, CacheEntry<Arc<CategoryIndex>>>>,
    /// Serializes refreshes so concurrent TTL expiry does not stampede the
    /// upstream with duplicate fetches.
    refresh: Mutex<()>,
}

impl TaxonomyCache {
    pub fn new(client: Arc<ResilientClient>, endpoint: String) -> Self {
        Self::with_ttl(client, endpoint, TAXONOMY_CACHE_TTL)
    }

    pub fn with_ttl(client: Arc<ResilientClient>, endpoint: String, ttl: Duration) -> Self {
        Self {
            client,
            endpoint,
            ttl,
            entries: RwLock::new(HashMap::new()),
            refresh: Mutex::new(()),
        }
    }

    /// The current category index for `app_id`, refreshed when expired.
    pub async fn get(&self, app_id: &str) -> Arc<CategoryIndex> {
        if let Some(index) = self.fresh_entry(app_id).await {
            return index;
        }

        let _guard = self.refresh.lock().await;
        // another caller may have refreshed while we waited for the guard
        if let Some(index) = self.fresh_entry(app_id).await {
            return index;
        }

        match self.fetch_index(app_id).await {
            Ok(index) => {
                tracing::info!(categories = index.len(), "taxonomy refreshed");
                let index = Arc::new(index);
                self.entries.write().await.insert(
                    app_id.to_string(),
                    CacheEntry::new(index.clone(), self.ttl),
                );
                index
            }
            Err(e) => {
                tracing::warn!(error = %e, "taxonomy refresh failed, no update");
                match self.entries.read().await.get(app_id) {
                    Some(entry) => entry.value.clone(),
                    None => Arc::new(CategoryIndex::default()),
                }
            }
        }
    }

    async fn fresh_entry(&self, app_id: &str) -> Option<Arc<CategoryIndex>> {
        let entries = self.entries.read().await;
        entries
            .get(app_id)
            .filter(|entry| entry.is_fresh())
            .map(|entry| entry.value.clone())
    }

    async fn fetch_index(&self, app_id: &str) -> Result<CategoryIndex, CatalogError> {
        let params = [("applicationId".to_string(), app_id.to_string())];
        let body = self.client.request(&self.endpoint, &params).await?;

        TaxonomyPayload::from_response(&body)
            .into_index()
            .ok_or_else(|| CatalogError::Decode("unrecognized taxonomy shape".to_string()))
    }
}
