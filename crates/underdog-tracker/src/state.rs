//! Per-match score state and goal deduplication.
//!
//! A match is unseen until the first snapshot with a live status arrives.
//! That snapshot is the baseline and emits nothing, even mid-game with a
//! non-zero score. From then on every strictly increased side count is a
//! goal, unless its dedup key was already emitted.

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info};
use underdog_core::{GoalEvent, GoalKey, MatchId, MatchSnapshot, MatchStatus, TeamSide};
use underdog_telemetry::Metrics;

/// Stored state of a tracked match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedMatch {
    pub match_id: MatchId,
    pub home_team: String,
    pub away_team: String,
    pub home_score: u32,
    pub away_score: u32,
    pub status: MatchStatus,
    pub last_updated: DateTime<Utc>,
}

impl TrackedMatch {
    fn from_snapshot(snapshot: &MatchSnapshot, now: DateTime<Utc>) -> Self {
        Self {
            match_id: snapshot.match_id,
            home_team: snapshot.home_team.clone(),
            away_team: snapshot.away_team.clone(),
            home_score: snapshot.home_score,
            away_score: snapshot.away_score,
            status: snapshot.status.clone(),
            last_updated: now,
        }
    }

    fn score(&self, side: TeamSide) -> u32 {
        match side {
            TeamSide::Home => self.home_score,
            TeamSide::Away => self.away_score,
        }
    }
}

#[derive(Debug, Default)]
struct StoreInner {
    matches: HashMap<MatchId, TrackedMatch>,
    /// Every key ever emitted. Survives pruning.
    emitted: HashSet<GoalKey>,
}

/// Match state store.
///
/// Ingest is atomic per snapshot: the comparison, dedup check and overwrite
/// all happen under one lock.
#[derive(Debug, Default)]
pub struct MatchStateStore {
    inner: Mutex<StoreInner>,
}

impl MatchStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ingest a snapshot observed now.
    pub fn ingest(&self, snapshot: &MatchSnapshot) -> Vec<GoalEvent> {
        self.ingest_at(snapshot, Utc::now())
    }

    /// Ingest a snapshot observed at `now`.
    ///
    /// Returns the new goal events, home before away.
    pub fn ingest_at(&self, snapshot: &MatchSnapshot, now: DateTime<Utc>) -> Vec<GoalEvent> {
        let mut inner = self.inner.lock();
        let StoreInner { matches, emitted } = &mut *inner;

        let Some(tracked) = matches.get_mut(&snapshot.match_id) else {
            if snapshot.status.is_live() {
                debug!(
                    match_id = %snapshot.match_id,
                    home = %snapshot.home_team,
                    away = %snapshot.away_team,
                    score = %format!("{}-{}", snapshot.home_score, snapshot.away_score),
                    status = %snapshot.status,
                    "Started tracking match"
                );
                matches.insert(snapshot.match_id, TrackedMatch::from_snapshot(snapshot, now));
                Metrics::tracked_matches(matches.len());
            }
            return Vec::new();
        };

        let mut goals = Vec::new();
        for side in TeamSide::BOTH {
            if snapshot.score(side) <= tracked.score(side) {
                continue;
            }

            let key = GoalKey::new(
                snapshot.match_id,
                snapshot.home_score,
                snapshot.away_score,
                side,
            );
            if !emitted.insert(key) {
                debug!(%key, "Goal already emitted, skipping");
                continue;
            }

            let team = snapshot.team(side);
            info!(
                match_id = %snapshot.match_id,
                team,
                side = %side,
                minute = snapshot.elapsed_minute,
                score = %format!("{}-{}", snapshot.home_score, snapshot.away_score),
                "Goal detected"
            );
            Metrics::goal_detected(side.as_str());

            goals.push(GoalEvent {
                match_id: snapshot.match_id,
                scoring_team: team.to_string(),
                side,
                minute: snapshot.elapsed_minute,
                home_score: snapshot.home_score,
                away_score: snapshot.away_score,
                timestamp: now,
                dedup_key: key,
            });
        }

        tracked.home_score = snapshot.home_score;
        tracked.away_score = snapshot.away_score;
        tracked.status = snapshot.status.clone();
        tracked.last_updated = now;

        goals
    }

    /// Drop matches not updated within `max_age` of now.
    pub fn prune_stale(&self, max_age: Duration) -> usize {
        self.prune_stale_at(max_age, Utc::now())
    }

    /// Drop matches whose last update is older than `now - max_age`.
    ///
    /// Emitted goal keys are kept, so a pruned match that reappears is
    /// re-baselined and cannot emit an old goal again.
    pub fn prune_stale_at(&self, max_age: Duration, now: DateTime<Utc>) -> usize {
        let cutoff = now - max_age;
        let mut inner = self.inner.lock();
        let before = inner.matches.len();
        inner.matches.retain(|_, m| m.last_updated >= cutoff);
        let removed = before - inner.matches.len();

        if removed > 0 {
            debug!(removed, remaining = inner.matches.len(), "Pruned stale matches");
            Metrics::tracked_matches(inner.matches.len());
        }
        removed
    }

    /// Stored state of a match.
    pub fn get(&self, match_id: MatchId) -> Option<TrackedMatch> {
        self.inner.lock().matches.get(&match_id).cloned()
    }

    pub fn tracked_count(&self) -> usize {
        self.inner.lock().matches.len()
    }

    pub fn emitted_count(&self) -> usize {
        self.inner.lock().emitted.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snap(id: u64, home: u32, away: u32, status: &str) -> MatchSnapshot {
        MatchSnapshot {
            match_id: MatchId::new(id),
            league_id: None,
            home_team: "Arsenal".to_string(),
            away_team: "Burnley".to_string(),
            home_score: home,
            away_score: away,
            status: MatchStatus::from_code(status),
            elapsed_minute: Some(30),
        }
    }

    #[test]
    fn test_first_snapshot_is_baseline() {
        let store = MatchStateStore::new();
        assert!(store.ingest(&snap(1, 0, 0, "1H")).is_empty());
        assert!(store.ingest(&snap(2, 2, 1, "2H")).is_empty());
        assert_eq!(store.tracked_count(), 2);
        assert_eq!(store.get(MatchId::new(2)).unwrap().home_score, 2);
    }

    #[test]
    fn test_not_live_unseen_match_is_ignored() {
        let store = MatchStateStore::new();
        assert!(store.ingest(&snap(1, 0, 0, "NS")).is_empty());
        assert!(store.ingest(&snap(1, 3, 0, "FT")).is_empty());
        assert_eq!(store.tracked_count(), 0);
    }

    #[test]
    fn test_identical_scores_emit_nothing() {
        let store = MatchStateStore::new();
        store.ingest(&snap(1, 1, 0, "1H"));
        assert!(store.ingest(&snap(1, 1, 0, "1H")).is_empty());
    }

    #[test]
    fn test_home_goal() {
        let store = MatchStateStore::new();
        store.ingest(&snap(1, 1, 0, "1H"));

        let goals = store.ingest(&snap(1, 2, 0, "2H"));
        assert_eq!(goals.len(), 1);
        assert_eq!(goals[0].side, TeamSide::Home);
        assert_eq!(goals[0].scoring_team, "Arsenal");
        assert_eq!((goals[0].home_score, goals[0].away_score), (2, 0));
        assert_eq!(goals[0].minute, Some(30));
        assert_eq!(store.get(MatchId::new(1)).unwrap().status, MatchStatus::SecondHalf);
    }

    #[test]
    fn test_decrease_emits_nothing_and_overwrites() {
        let store = MatchStateStore::new();
        store.ingest(&snap(1, 1, 0, "1H"));

        assert!(store.ingest(&snap(1, 0, 0, "1H")).is_empty());
        let tracked = store.get(MatchId::new(1)).unwrap();
        assert_eq!((tracked.home_score, tracked.away_score), (0, 0));
    }

    #[test]
    fn test_both_sides_score_home_first() {
        let store = MatchStateStore::new();
        store.ingest(&snap(1, 0, 0, "1H"));

        let goals = store.ingest(&snap(1, 1, 1, "1H"));
        assert_eq!(goals.len(), 2);
        assert_eq!(goals[0].side, TeamSide::Home);
        assert_eq!(goals[1].side, TeamSide::Away);
        assert_eq!(goals[1].scoring_team, "Burnley");
    }

    #[test]
    fn test_dedup_across_correction() {
        let store = MatchStateStore::new();
        store.ingest(&snap(1, 0, 0, "1H"));

        assert_eq!(store.ingest(&snap(1, 1, 0, "1H")).len(), 1);
        // Goal disallowed, then the feed flips back to the same scoreline.
        assert!(store.ingest(&snap(1, 0, 0, "1H")).is_empty());
        assert!(store.ingest(&snap(1, 1, 0, "1H")).is_empty());
        assert_eq!(store.emitted_count(), 1);
    }

    #[test]
    fn test_each_dedup_key_emitted_at_most_once() {
        let store = MatchStateStore::new();
        let sequence = [
            (0, 0),
            (1, 0),
            (1, 1),
            (0, 1),
            (1, 1),
            (2, 1),
            (1, 1),
            (2, 1),
            (2, 2),
        ];

        let mut seen = HashSet::new();
        for (home, away) in sequence {
            for goal in store.ingest(&snap(1, home, away, "2H")) {
                assert!(seen.insert(goal.dedup_key), "duplicate {}", goal.dedup_key);
            }
        }
        assert_eq!(seen.len(), store.emitted_count());
    }

    #[test]
    fn test_prune_stale_keeps_dedup_set() {
        let store = MatchStateStore::new();
        let t0 = Utc::now();
        store.ingest_at(&snap(1, 0, 0, "1H"), t0);
        store.ingest_at(&snap(1, 1, 0, "1H"), t0);
        store.ingest_at(&snap(2, 0, 0, "1H"), t0 + Duration::hours(3));

        let removed = store.prune_stale_at(Duration::hours(2), t0 + Duration::hours(4));
        assert_eq!(removed, 1);
        assert!(store.get(MatchId::new(1)).is_none());
        assert!(store.get(MatchId::new(2)).is_some());

        // Reappearing match re-baselines; the old goal is not re-emitted.
        assert!(store.ingest(&snap(1, 0, 0, "2H")).is_empty());
        assert!(store.ingest(&snap(1, 1, 0, "2H")).is_empty());
        assert_eq!(store.ingest(&snap(1, 2, 0, "2H")).len(), 1);
    }
}
