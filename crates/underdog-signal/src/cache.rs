//! Time-bounded odds cache.
//!
//! Quotes are keyed by match id and fresh while `now - fetched_at < ttl`.
//! Empty quotes are never stored, so a bookmaker that has not priced a
//! match yet is asked again next time. Concurrent lookups for the same
//! match share one upstream fetch.

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;
use underdog_api::ApiResult;
use underdog_core::{MatchId, OddsQuote};
use underdog_telemetry::Metrics;

/// Source of the current time.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Odds cache.
pub struct OddsCache {
    ttl: Duration,
    entries: DashMap<MatchId, OddsQuote>,
    /// One fetch lock per match.
    inflight: DashMap<MatchId, Arc<Mutex<()>>>,
    clock: Clock,
}

impl OddsCache {
    /// Create a cache using the system clock.
    pub fn new(ttl_secs: u64) -> Self {
        Self::with_clock(ttl_secs, Arc::new(Utc::now))
    }

    /// Create a cache with an injected clock.
    pub fn with_clock(ttl_secs: u64, clock: Clock) -> Self {
        Self {
            ttl: Duration::seconds(ttl_secs as i64),
            entries: DashMap::new(),
            inflight: DashMap::new(),
            clock,
        }
    }

    /// Fresh cached quote, if any.
    pub fn get(&self, match_id: MatchId) -> Option<OddsQuote> {
        let now = (self.clock)();
        self.entries
            .get(&match_id)
            .filter(|entry| self.is_fresh(entry.value(), now))
            .map(|entry| entry.value().clone())
    }

    /// Return the cached quote or fetch, stamp and store a new one.
    pub async fn get_or_fetch<F, Fut>(&self, match_id: MatchId, fetch: F) -> ApiResult<OddsQuote>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = ApiResult<OddsQuote>>,
    {
        if let Some(quote) = self.get(match_id) {
            Metrics::odds_cache_hit();
            return Ok(quote);
        }

        let lock = self
            .inflight
            .entry(match_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let _guard = lock.lock().await;

        // Another caller may have filled the entry while we waited.
        if let Some(quote) = self.get(match_id) {
            Metrics::odds_cache_hit();
            return Ok(quote);
        }

        Metrics::odds_cache_miss();
        let mut quote = fetch().await?;
        quote.fetched_at = (self.clock)();

        if quote.is_empty() {
            debug!(%match_id, "No odds available, not caching");
        } else {
            self.entries.insert(match_id, quote.clone());
        }
        Ok(quote)
    }

    /// Remove expired quotes and idle fetch locks.
    pub fn purge_expired(&self) -> usize {
        let now = (self.clock)();
        let before = self.entries.len();
        self.entries.retain(|_, quote| self.is_fresh(quote, now));
        self.inflight.retain(|_, lock| Arc::strong_count(lock) > 1);
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn is_fresh(&self, quote: &OddsQuote, now: DateTime<Utc>) -> bool {
        now - quote.fetched_at < self.ttl
    }
}
