use crate::core::rates::{RateProvider, RateSnapshot, RateSource};
use crate::core::source::SourceError;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::debug;

/// Single slot holding the last successfully fetched snapshot.
#[derive(Debug)]
pub struct RateCache {
    ttl: Duration,
    entry: Option<(Arc<RateSnapshot>, Instant)>,
}

impl RateCache {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, entry: None }
    }

    /// The cached snapshot, if it is younger than the validity window at `now`.
    pub fn fresh(&self, now: Instant) -> Option<Arc<RateSnapshot>> {
        self.entry
            .as_ref()
            .filter(|(_, stored_at)| now.saturating_duration_since(*stored_at) < self.ttl)
            .map(|(snapshot, _)| Arc::clone(snapshot))
    }

    pub fn store(&mut self, snapshot: Arc<RateSnapshot>, at: Instant) {
        self.entry = Some((snapshot, at));
    }

    /// The last stored snapshot regardless of its age.
    #[cfg(test)]
    pub fn latest(&self) -> Option<Arc<RateSnapshot>> {
        self.entry.as_ref().map(|(snapshot, _)| Arc::clone(snapshot))
    }
}

/// Serves rates from a [`RateCache`], going to `inner` once the window has elapsed.
pub struct CachingRateSource<T: RateSource> {
    inner: T,
    cache: Mutex<RateCache>,
}

impl<T: RateSource> CachingRateSource<T> {
    pub fn new(inner: T, ttl: Duration) -> Self {
        Self {
            inner,
            cache: Mutex::new(RateCache::new(ttl)),
        }
    }
}

#[async_trait]
impl<T: RateSource> RateProvider for CachingRateSource<T> {
    async fn valid_rates(&self) -> Result<Arc<RateSnapshot>, SourceError> {
        // Held across the fetch so concurrent callers wait for one refetch.
        let mut cache = self.cache.lock().await;
        if let Some(snapshot) = cache.fresh(Instant::now()) {
            debug!("Cache HIT for exchange rates");
            return Ok(snapshot);
        }
        debug!("Cache MISS for exchange rates");

        let snapshot = Arc::new(self.inner.fetch().await?);
        cache.store(Arc::clone(&snapshot), Instant::now());
        Ok(snapshot)
    }
}
