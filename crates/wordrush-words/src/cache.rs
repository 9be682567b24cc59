//! Time-to-live cache in front of a [`WordSource`].

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::{SupplyError, WordRecord, WordSource};

/// Cache settings.
#[derive(Debug, Clone)]
pub struct WordCacheConfig {
    /// How long a fetched catalogue is served before the next request
    /// refetches it. Default: 60 seconds.
    pub ttl: Duration,
}

impl Default for WordCacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(60),
        }
    }
}

struct Cached {
    words: Arc<[WordRecord]>,
    fetched_at: Instant,
}

/// Serves the word catalogue, refetching at most once per TTL.
///
/// Shared by every room in the process. Concurrent callers that find the
/// cache stale wait for a single refetch instead of all hitting the source.
/// Only callers that need the catalogue (rooms starting a game) ever wait;
/// running games never touch the cache.
pub struct WordCache<S: WordSource> {
    source: S,
    config: WordCacheConfig,
    slot: Mutex<Option<Cached>>,
}

impl<S: WordSource> WordCache<S> {
    /// Creates a cache with the default 60 s TTL.
    pub fn new(source: S) -> Self {
        Self::with_config(source, WordCacheConfig::default())
    }

    pub fn with_config(source: S, config: WordCacheConfig) -> Self {
        Self {
            source,
            config,
            slot: Mutex::new(None),
        }
    }

    /// Returns the catalogue, fetching it if the cached copy is missing or
    /// older than the TTL.
    ///
    /// # Errors
    /// Propagates the source's error, or [`SupplyError::Empty`] if it
    /// returned no records. Failures are not cached.
    pub async fn catalogue(&self) -> Result<Arc<[WordRecord]>, SupplyError> {
        let mut slot = self.slot.lock().await;

        if let Some(cached) = slot.as_ref() {
            if cached.fetched_at.elapsed() < self.config.ttl {
                return Ok(Arc::clone(&cached.words));
            }
        }

        let words = match self.source.fetch().await {
            Ok(words) => words,
            Err(e) => {
                tracing::warn!(error = %e, "word catalogue fetch failed");
                return Err(e);
            }
        };
        if words.is_empty() {
            tracing::warn!("word catalogue fetch returned no words");
            return Err(SupplyError::Empty);
        }

        let words: Arc<[WordRecord]> = words.into();
        tracing::info!(count = words.len(), "word catalogue refreshed");
        *slot = Some(Cached {
            words: Arc::clone(&words),
            fetched_at: Instant::now(),
        });
        Ok(words)
    }

    /// Drops the cached copy so the next call refetches.
    pub async fn invalidate(&self) {
        self.slot.lock().await.take();
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn ttl(&self) -> Duration {
        self.config.ttl
    }
}
