use crate::core::cache::KeyValueCollection;
use crate::core::{FxError, RateSource, RateTable};
use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

const LATEST_KEY: &[u8] = b"latest";

/// Persisted record of the latest table and when it was fetched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub rates: Option<RateTable>,
    pub last_fetch: Option<DateTime<Utc>>,
}

impl CacheEntry {
    fn is_fresh(&self, now: DateTime<Utc>, freshness: Duration) -> bool {
        match (&self.rates, self.last_fetch) {
            (Some(_), Some(fetched_at)) => now - fetched_at < freshness,
            _ => false,
        }
    }
}

/// Caches the latest rate table of `inner` for a freshness window.
///
/// Historical tables are cached without expiry since past days do not change.
pub struct RateCache<S: RateSource> {
    inner: S,
    store: Arc<dyn KeyValueCollection>,
    freshness: Duration,
    serve_stale_on_error: bool,
}

impl<S: RateSource> RateCache<S> {
    pub fn new(inner: S, store: Arc<dyn KeyValueCollection>, freshness: Duration) -> Self {
        Self {
            inner,
            store,
            freshness,
            serve_stale_on_error: false,
        }
    }

    pub fn serve_stale_on_error(mut self, enabled: bool) -> Self {
        self.serve_stale_on_error = enabled;
        self
    }

    /// Latest rate table, refreshed from the source when the cached one expired.
    pub async fn get(&self) -> Result<RateTable, FxError> {
        self.get_at(Utc::now()).await
    }

    pub(crate) async fn get_at(&self, now: DateTime<Utc>) -> Result<RateTable, FxError> {
        let entry = match self.load().await {
            Ok(entry) => entry,
            Err(e) => {
                warn!("{}. Treating cache as cold", e);
                CacheEntry::default()
            }
        };

        if entry.is_fresh(now, self.freshness) {
            if let Some(rates) = &entry.rates {
                debug!("Cache HIT for latest rates");
                return Ok(rates.clone());
            }
        }

        debug!("Cache MISS for latest rates");
        match self.inner.fetch_latest().await {
            Ok(rates) => {
                let fresh = CacheEntry {
                    rates: Some(rates.clone()),
                    last_fetch: Some(now),
                };
                self.save(&fresh).await;
                Ok(rates)
            }
            Err(e) => match entry.rates {
                Some(stale) if self.serve_stale_on_error => {
                    warn!(
                        "Failed to refresh rates: {}. Using rates fetched at {:?}",
                        e, entry.last_fetch
                    );
                    Ok(stale)
                }
                _ => Err(e),
            },
        }
    }

    async fn load(&self) -> Result<CacheEntry, FxError> {
        match self.store.get(LATEST_KEY).await {
            Some(bytes) => serde_json::from_slice(&bytes)
                .map_err(|e| FxError::CacheRead(format!("Corrupt cache entry: {e}"))),
            None => Ok(CacheEntry::default()),
        }
    }

    async fn save(&self, entry: &CacheEntry) {
        match serde_json::to_vec(entry) {
            Ok(bytes) => self.store.put(LATEST_KEY, &bytes).await,
            Err(e) => warn!("Failed to serialize cache entry: {}", e),
        }
    }
}

#[async_trait]
impl<S: RateSource> RateSource for RateCache<S> {
    async fn fetch_latest(&self) -> Result<RateTable, FxError> {
        self.get().await
    }

    async fn fetch_historical(&self, date: NaiveDate) -> Result<RateTable, FxError> {
        let key = format!("historical:{}", date.format("%Y-%m-%d"));
        if let Some(bytes) = self.store.get(key.as_bytes()).await {
            match serde_json::from_slice(&bytes) {
                Ok(rates) => return Ok(rates),
                Err(e) => warn!("Corrupt cache entry for {}: {}", key, e),
            }
        }

        let rates = self.inner.fetch_historical(date).await?;
        match serde_json::to_vec(&rates) {
            Ok(bytes) => self.store.put(key.as_bytes(), &bytes).await,
            Err(e) => warn!("Failed to serialize cache entry for {}: {}", key, e),
        }
        Ok(rates)
    }
}
