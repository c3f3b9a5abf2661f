//! Core domain types for the underdog goal trading bot.
//!
//! This crate provides the types shared by every other crate:
//! - `MatchId`, `LeagueId`: provider-assigned identifiers
//! - `MatchStatus`, `MatchSnapshot`: one poll's view of a fixture
//! - `TeamSide`, `GoalKey`, `GoalEvent`: detected goals and their dedup key
//! - `OddsQuote`: decimal Match Winner odds for a fixture
//! - `TradingSignal`, `SignalAction`: output of the underdog rule
//! - `PerformanceStats`: ledger performance snapshot

pub mod error;
pub mod fixture;
pub mod goal;
pub mod odds;
pub mod signal;
pub mod stats;

pub use error::{CoreError, Result};
pub use fixture::{league_name, LeagueId, MatchId, MatchSnapshot, MatchStatus, DEFAULT_LEAGUES};
pub use goal::{GoalEvent, GoalKey, TeamSide};
pub use odds::{implied_probability, parse_decimal_odds, OddsQuote};
pub use signal::{SignalAction, TradingSignal};
pub use stats::PerformanceStats;
