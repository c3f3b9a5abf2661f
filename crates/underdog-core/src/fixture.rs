//! Fixture identification and per-poll match snapshots.
//!
//! A fixture is one scheduled football game. The provider assigns it an
//! integer id that stays stable for the lifetime of the match.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Provider-assigned fixture identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MatchId(pub u64);

impl MatchId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for MatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Provider-assigned league identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LeagueId(pub u32);

impl LeagueId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }
}

impl fmt::Display for LeagueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Leagues tracked when no explicit set is configured:
/// Premier League, La Liga, Serie A, Bundesliga, Ligue 1.
pub const DEFAULT_LEAGUES: [u32; 5] = [39, 140, 135, 78, 61];

/// Display name for well-known leagues.
pub fn league_name(league: LeagueId) -> Option<&'static str> {
    match league.0 {
        39 => Some("Premier League"),
        140 => Some("La Liga"),
        135 => Some("Serie A"),
        78 => Some("Bundesliga"),
        61 => Some("Ligue 1"),
        2 => Some("UEFA Champions League"),
        3 => Some("UEFA Europa League"),
        _ => None,
    }
}

/// Match status as reported by the provider's short status code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchStatus {
    /// "NS"
    NotStarted,
    /// "1H"
    FirstHalf,
    /// "HT"
    HalfTime,
    /// "2H"
    SecondHalf,
    /// "ET"
    ExtraTime,
    /// "BT": break before or during extra time.
    BreakTime,
    /// "P": penalty shootout in progress.
    Penalties,
    /// "FT"
    FullTime,
    /// "AET"
    AfterExtraTime,
    /// "PEN": finished after penalties.
    FinishedPenalties,
    /// Any code this crate does not model (postponed, suspended, ...).
    Other(String),
}

impl MatchStatus {
    /// Parse a short status code.
    pub fn from_code(code: &str) -> Self {
        match code {
            "NS" => Self::NotStarted,
            "1H" => Self::FirstHalf,
            "HT" => Self::HalfTime,
            "2H" => Self::SecondHalf,
            "ET" => Self::ExtraTime,
            "BT" => Self::BreakTime,
            "P" => Self::Penalties,
            "FT" => Self::FullTime,
            "AET" => Self::AfterExtraTime,
            "PEN" => Self::FinishedPenalties,
            other => Self::Other(other.to_string()),
        }
    }

    /// Short status code.
    pub fn code(&self) -> &str {
        match self {
            Self::NotStarted => "NS",
            Self::FirstHalf => "1H",
            Self::HalfTime => "HT",
            Self::SecondHalf => "2H",
            Self::ExtraTime => "ET",
            Self::BreakTime => "BT",
            Self::Penalties => "P",
            Self::FullTime => "FT",
            Self::AfterExtraTime => "AET",
            Self::FinishedPenalties => "PEN",
            Self::Other(code) => code,
        }
    }

    /// Whether the match is in play. Only live matches start being tracked.
    pub fn is_live(&self) -> bool {
        matches!(
            self,
            Self::FirstHalf
                | Self::HalfTime
                | Self::SecondHalf
                | Self::ExtraTime
                | Self::BreakTime
                | Self::Penalties
        )
    }

    /// Whether the match has finished.
    pub fn is_finished(&self) -> bool {
        matches!(
            self,
            Self::FullTime | Self::AfterExtraTime | Self::FinishedPenalties
        )
    }
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// One poll's view of a fixture.
///
/// Produced fresh from every API response and never mutated; the tracker
/// compares it against what it stored on the previous poll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSnapshot {
    pub match_id: MatchId,
    /// League the fixture belongs to, if the payload carried it.
    pub league_id: Option<LeagueId>,
    pub home_team: String,
    pub away_team: String,
    pub home_score: u32,
    pub away_score: u32,
    pub status: MatchStatus,
    /// Minutes played, if the provider reported it.
    pub elapsed_minute: Option<u32>,
}

impl MatchSnapshot {
    /// Team name for the given side.
    pub fn team(&self, side: crate::TeamSide) -> &str {
        match side {
            crate::TeamSide::Home => self.home_team.as_str(),
            crate::TeamSide::Away => self.away_team.as_str(),
        }
    }

    /// Score for the given side.
    pub fn score(&self, side: crate::TeamSide) -> u32 {
        match side {
            crate::TeamSide::Home => self.home_score,
            crate::TeamSide::Away => self.away_score,
        }
    }
}
