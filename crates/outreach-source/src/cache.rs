use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::debug;

use outreach_types::api::GlobalStats;

use crate::error::Result;
use crate::{History, HistorySource};

struct Slot<T> {
    value: T,
    fetched_at: Instant,
}

impl<T: Clone> Slot<T> {
    fn fresh(&self, ttl: Duration) -> Option<T> {
        (self.fetched_at.elapsed() < ttl).then(|| self.value.clone())
    }
}

/// Keeps the last successful answers of an inner source for `ttl`.
/// Failures are never cached.
pub struct CachedSource<S> {
    inner: S,
    ttl: Duration,
    history: RwLock<Option<Slot<History>>>,
    global: RwLock<Option<Slot<GlobalStats>>>,
}

impl<S: HistorySource> CachedSource<S> {
    pub fn new(inner: S, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            history: RwLock::new(None),
            global: RwLock::new(None),
        }
    }
}

#[async_trait]
impl<S: HistorySource> HistorySource for CachedSource<S> {
    async fn fetch_history(&self) -> Result<History> {
        if let Some(hit) = self.history.read().await.as_ref().and_then(|s| s.fresh(self.ttl)) {
            return Ok(hit);
        }

        let mut slot = self.history.write().await;
        if let Some(hit) = slot.as_ref().and_then(|s| s.fresh(self.ttl)) {
            return Ok(hit);
        }
        debug!("history cache miss");
        let value = self.inner.fetch_history().await?;
        *slot = Some(Slot {
            value: value.clone(),
            fetched_at: Instant::now(),
        });
        Ok(value)
    }

    async fn fetch_global_stats(&self) -> Result<GlobalStats> {
        if let Some(hit) = self.global.read().await.as_ref().and_then(|s| s.fresh(self.ttl)) {
            return Ok(hit);
        }

        let mut slot = self.global.write().await;
        if let Some(hit) = slot.as_ref().and_then(|s| s.fresh(self.ttl)) {
            return Ok(hit);
        }
        debug!("global stats cache miss");
        let value = self.inner.fetch_global_stats().await?;
        *slot = Some(Slot {
            value: value.clone(),
            fetched_at: Instant::now(),
        });
        Ok(value)
    }

    async fn invalidate(&self) {
        self.history.write().await.take();
        self.global.write().await.take();
        self.inner.invalidate().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::StaticSource;
    use std::sync::Arc;

    const TTL: Duration = Duration::from_secs(300);

    fn cached() -> (Arc<StaticSource>, CachedSource<Arc<StaticSource>>) {
        let inner = Arc::new(StaticSource::new(Vec::new()));
        (inner.clone(), CachedSource::new(inner, TTL))
    }

    #[tokio::test(start_paused = true)]
    async fn serves_from_cache_within_ttl() {
        let (inner, cache) = cached();

        cache.fetch_history().await.unwrap();
        tokio::time::advance(TTL - Duration::from_secs(1)).await;
        cache.fetch_history().await.unwrap();

        assert_eq!(inner.history_fetches(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn refetches_after_ttl() {
        let (inner, cache) = cached();

        cache.fetch_history().await.unwrap();
        cache.fetch_global_stats().await.unwrap();
        tokio::time::advance(TTL).await;
        cache.fetch_history().await.unwrap();
        cache.fetch_global_stats().await.unwrap();

        assert_eq!(inner.history_fetches(), 2);
        assert_eq!(inner.global_fetches(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn invalidate_drops_both_slots() {
        let (inner, cache) = cached();

        cache.fetch_history().await.unwrap();
        cache.fetch_global_stats().await.unwrap();
        cache.invalidate().await;
        cache.fetch_history().await.unwrap();
        cache.fetch_global_stats().await.unwrap();

        assert_eq!(inner.history_fetches(), 2);
        assert_eq!(inner.global_fetches(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn failures_are_not_cached() {
        let inner = Arc::new(StaticSource::failing("boom"));
        let cache = CachedSource::new(inner.clone(), TTL);

        assert!(cache.fetch_history().await.is_err());
        assert!(cache.fetch_history().await.is_err());
        assert_eq!(inner.history_fetches(), 2);
    }
}
