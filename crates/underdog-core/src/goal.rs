//! Goal events and their deduplication key.

use crate::MatchId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which team in a fixture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TeamSide {
    Home,
    Away,
}

impl TeamSide {
    /// Both sides, home first. Goal detection walks sides in this order.
    pub const BOTH: [TeamSide; 2] = [TeamSide::Home, TeamSide::Away];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::Away => "away",
        }
    }
}

impl fmt::Display for TeamSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for TeamSide {
    type Err = crate::CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "home" => Ok(Self::Home),
            "away" => Ok(Self::Away),
            other => Err(crate::CoreError::InvalidSide(other.to_string())),
        }
    }
}

/// Identity of a goal: the fixture, the scoreline it produced and who scored.
///
/// Two polls that observe the same goal produce the same key, so a goal is
/// emitted at most once no matter how many times the feed repeats it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GoalKey {
    pub match_id: MatchId,
    pub home_score: u32,
    pub away_score: u32,
    pub side: TeamSide,
}

impl GoalKey {
    pub fn new(match_id: MatchId, home_score: u32, away_score: u32, side: TeamSide) -> Self {
        Self {
            match_id,
            home_score,
            away_score,
            side,
        }
    }
}

impl fmt::Display for GoalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}_{}-{}_{}",
            self.match_id, self.home_score, self.away_score, self.side
        )
    }
}

/// A newly detected goal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalEvent {
    pub match_id: MatchId,
    pub scoring_team: String,
    pub side: TeamSide,
    /// Match minute reported with the snapshot that revealed the goal.
    pub minute: Option<u32>,
    /// Scoreline after the goal.
    pub home_score: u32,
    pub away_score: u32,
    /// Detection time.
    pub timestamp: DateTime<Utc>,
    pub dedup_key: GoalKey,
}

impl GoalEvent {
    /// Create a goal event stamped with the current time.
    pub fn new(
        match_id: MatchId,
        scoring_team: impl Into<String>,
        side: TeamSide,
        minute: Option<u32>,
        home_score: u32,
        away_score: u32,
    ) -> Self {
        Self {
            match_id,
            scoring_team: scoring_team.into(),
            side,
            minute,
            home_score,
            away_score,
            timestamp: Utc::now(),
            dedup_key: GoalKey::new(match_id, home_score, away_score, side),
        }
    }
}
