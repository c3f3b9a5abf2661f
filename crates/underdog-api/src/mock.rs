//! Scripted `FootballApi` for tests and offline runs.

use crate::client::{BoxFuture, FootballApi};
use crate::error::{ApiError, ApiResult};
use chrono::{NaiveDate, Utc};
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use underdog_core::{MatchId, MatchSnapshot, OddsQuote};

/// Mock API.
///
/// Live fixture responses are queued and consumed one per call; once the
/// queue is empty every call returns no fixtures. Odds are looked up by
/// match id and stamped with the current time.
#[derive(Debug, Default)]
pub struct MockFootballApi {
    live: Mutex<VecDeque<ApiResult<Vec<MatchSnapshot>>>>,
    by_date: Mutex<HashMap<NaiveDate, Vec<MatchSnapshot>>>,
    odds: Mutex<HashMap<MatchId, OddsQuote>>,
    odds_delay: Mutex<Option<Duration>>,
    fail_odds: AtomicBool,
    live_calls: AtomicUsize,
    odds_calls: AtomicUsize,
}

impl MockFootballApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the next live fixtures response.
    pub fn push_live(&self, fixtures: Vec<MatchSnapshot>) {
        self.live.lock().push_back(Ok(fixtures));
    }

    /// Queue a failing live fixtures response.
    pub fn push_live_error(&self, error: ApiError) {
        self.live.lock().push_back(Err(error));
    }

    /// Set fixtures returned for a date.
    pub fn set_fixtures_by_date(&self, date: NaiveDate, fixtures: Vec<MatchSnapshot>) {
        self.by_date.lock().insert(date, fixtures);
    }

    /// Set odds for a fixture.
    pub fn set_odds(&self, quote: OddsQuote) {
        self.odds.lock().insert(quote.match_id, quote);
    }

    /// Make odds requests fail with a provider error.
    pub fn set_fail_odds(&self, fail: bool) {
        self.fail_odds.store(fail, Ordering::SeqCst);
    }

    /// Delay every odds response.
    pub fn set_odds_delay(&self, delay: Duration) {
        *self.odds_delay.lock() = Some(delay);
    }

    /// Number of live fixture requests served.
    pub fn live_calls(&self) -> usize {
        self.live_calls.load(Ordering::SeqCst)
    }

    /// Number of odds requests served.
    pub fn odds_calls(&self) -> usize {
        self.odds_calls.load(Ordering::SeqCst)
    }
}

impl FootballApi for MockFootballApi {
    fn live_fixtures(&self) -> BoxFuture<'_, ApiResult<Vec<MatchSnapshot>>> {
        Box::pin(async move {
            self.live_calls.fetch_add(1, Ordering::SeqCst);
            self.live.lock().pop_front().unwrap_or_else(|| Ok(Vec::new()))
        })
    }

    fn fixtures_by_date(&self, date: NaiveDate) -> BoxFuture<'_, ApiResult<Vec<MatchSnapshot>>> {
        Box::pin(async move { Ok(self.by_date.lock().get(&date).cloned().unwrap_or_default()) })
    }

    fn odds(&self, match_id: MatchId) -> BoxFuture<'_, ApiResult<OddsQuote>> {
        Box::pin(async move {
            self.odds_calls.fetch_add(1, Ordering::SeqCst);

            let delay = *self.odds_delay.lock();
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }

            if self.fail_odds.load(Ordering::SeqCst) {
                return Err(ApiError::Provider("mock odds failure".to_string()));
            }

            let now = Utc::now();
            Ok(match self.odds.lock().get(&match_id) {
                Some(quote) => OddsQuote {
                    fetched_at: now,
                    ..quote.clone()
                },
                None => OddsQuote::empty(match_id, now),
            })
        })
    }

    fn timezones(&self) -> BoxFuture<'_, ApiResult<usize>> {
        Box::pin(async move { Ok(1) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use underdog_core::{MatchStatus, TeamSide};

    fn snapshot(id: u64) -> MatchSnapshot {
        MatchSnapshot {
            match_id: MatchId::new(id),
            league_id: None,
            home_team: "Home".to_string(),
            away_team: "Away".to_string(),
            home_score: 0,
            away_score: 0,
            status: MatchStatus::FirstHalf,
            elapsed_minute: Some(5),
        }
    }

    #[tokio::test]
    async fn test_live_queue_consumed_in_order() {
        let api = MockFootballApi::new();
        api.push_live(vec![snapshot(1)]);
        api.push_live_error(ApiError::Provider("down".to_string()));

        assert_eq!(api.live_fixtures().await.unwrap().len(), 1);
        assert!(api.live_fixtures().await.is_err());
        assert!(api.live_fixtures().await.unwrap().is_empty());
        assert_eq!(api.live_calls(), 3);
    }

    #[tokio::test]
    async fn test_odds_lookup() {
        let api = MockFootballApi::new();
        let mut quote = OddsQuote::empty(MatchId::new(4), Utc::now());
        quote.away_odds = Some(dec!(3.2));
        api.set_odds(quote);

        let found = api.odds(MatchId::new(4)).await.unwrap();
        assert_eq!(found.odds_for(TeamSide::Away), Some(dec!(3.2)));
        assert!(api.odds(MatchId::new(5)).await.unwrap().is_empty());

        api.set_fail_odds(true);
        assert!(api.odds(MatchId::new(4)).await.is_err());
        assert_eq!(api.odds_calls(), 3);
    }
}
