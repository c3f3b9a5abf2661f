//! Live scan over the tracked leagues.

use crate::error::TrackerResult;
use crate::state::MatchStateStore;
use chrono::{Duration, NaiveDate};
use std::collections::HashSet;
use tracing::{debug, warn};
use underdog_api::DynFootballApi;
use underdog_core::{GoalEvent, LeagueId, MatchSnapshot};
use underdog_telemetry::Metrics;

/// Polls live fixtures and feeds them through the state store.
pub struct MatchTracker {
    api: DynFootballApi,
    store: MatchStateStore,
    leagues: HashSet<LeagueId>,
}

impl MatchTracker {
    pub fn new(api: DynFootballApi, leagues: impl IntoIterator<Item = LeagueId>) -> Self {
        Self {
            api,
            store: MatchStateStore::new(),
            leagues: leagues.into_iter().collect(),
        }
    }

    pub fn store(&self) -> &MatchStateStore {
        &self.store
    }

    pub fn leagues(&self) -> &HashSet<LeagueId> {
        &self.leagues
    }

    /// Fetch live fixtures once and return newly detected goals.
    ///
    /// Transport, provider and payload errors are logged and yield no goals.
    pub async fn scan_for_goals(&self) -> Vec<GoalEvent> {
        match self.try_scan().await {
            Ok(goals) => goals,
            Err(e) => {
                warn!(error = %e, "Live scan failed");
                Metrics::cycle_error("scan");
                Vec::new()
            }
        }
    }

    async fn try_scan(&self) -> TrackerResult<Vec<GoalEvent>> {
        let fixtures = self.api.live_fixtures().await?;
        let total = fixtures.len();

        let mut goals = Vec::new();
        let mut in_scope = 0usize;
        for snapshot in fixtures.iter().filter(|s| self.is_tracked_league(s)) {
            in_scope += 1;
            goals.extend(self.store.ingest(snapshot));
        }

        debug!(
            total,
            in_scope,
            tracked = self.store.tracked_count(),
            goals = goals.len(),
            "Live scan complete"
        );
        Ok(goals)
    }

    /// Fixtures on `date` in the tracked leagues.
    pub async fn fixtures_by_date(&self, date: NaiveDate) -> TrackerResult<Vec<MatchSnapshot>> {
        let fixtures = self.api.fixtures_by_date(date).await?;
        Ok(fixtures
            .into_iter()
            .filter(|s| self.is_tracked_league(s))
            .collect())
    }

    /// Forget matches the live feed has not returned for `max_age`.
    pub fn prune_stale(&self, max_age: Duration) -> usize {
        self.store.prune_stale(max_age)
    }

    fn is_tracked_league(&self, snapshot: &MatchSnapshot) -> bool {
        snapshot
            .league_id
            .is_some_and(|league| self.leagues.contains(&league))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use underdog_api::{ApiError, MockFootballApi};
    use underdog_core::{MatchId, MatchStatus, TeamSide};

    fn snap(id: u64, league: u32, home: u32, away: u32) -> MatchSnapshot {
        MatchSnapshot {
            match_id: MatchId::new(id),
            league_id: Some(LeagueId::new(league)),
            home_team: format!("Home {id}"),
            away_team: format!("Away {id}"),
            home_score: home,
            away_score: away,
            status: MatchStatus::SecondHalf,
            elapsed_minute: Some(55),
        }
    }

    fn tracker(api: Arc<MockFootballApi>) -> MatchTracker {
        MatchTracker::new(api, [LeagueId::new(39), LeagueId::new(140)])
    }

    #[tokio::test]
    async fn test_scan_detects_goal_on_second_poll() {
        let api = Arc::new(MockFootballApi::new());
        api.push_live(vec![snap(1, 39, 0, 0)]);
        api.push_live(vec![snap(1, 39, 0, 1)]);
        let tracker = tracker(api.clone());

        assert!(tracker.scan_for_goals().await.is_empty());
        let goals = tracker.scan_for_goals().await;

        assert_eq!(goals.len(), 1);
        assert_eq!(goals[0].side, TeamSide::Away);
        assert_eq!(goals[0].scoring_team, "Away 1");
        assert_eq!(api.live_calls(), 2);
    }

    #[tokio::test]
    async fn test_scan_filters_untracked_leagues() {
        let api = Arc::new(MockFootballApi::new());
        api.push_live(vec![snap(1, 39, 0, 0), snap(2, 999, 0, 0)]);
        api.push_live(vec![snap(1, 39, 1, 0), snap(2, 999, 1, 0)]);
        let tracker = tracker(api);

        tracker.scan_for_goals().await;
        let goals = tracker.scan_for_goals().await;

        assert_eq!(goals.len(), 1);
        assert_eq!(goals[0].match_id, MatchId::new(1));
        assert_eq!(tracker.store().tracked_count(), 1);
    }

    #[tokio::test]
    async fn test_scan_error_yields_no_goals_and_keeps_state() {
        let api = Arc::new(MockFootballApi::new());
        api.push_live(vec![snap(1, 140, 0, 0)]);
        api.push_live_error(ApiError::Provider("requests limit reached".to_string()));
        api.push_live(vec![snap(1, 140, 1, 0)]);
        let tracker = tracker(api);

        assert!(tracker.scan_for_goals().await.is_empty());
        assert!(tracker.scan_for_goals().await.is_empty());
        assert_eq!(tracker.scan_for_goals().await.len(), 1);
    }

    #[tokio::test]
    async fn test_fixtures_by_date_filters_leagues() {
        let api = Arc::new(MockFootballApi::new());
        let date = NaiveDate::from_ymd_opt(2024, 3, 2).unwrap();
        api.set_fixtures_by_date(date, vec![snap(1, 39, 0, 0), snap(2, 2, 0, 0)]);
        let tracker = tracker(api);

        let fixtures = tracker.fixtures_by_date(date).await.unwrap();
        assert_eq!(fixtures.len(), 1);
        assert_eq!(fixtures[0].match_id, MatchId::new(1));
    }
}
