//! Trading signal produced by the underdog rule.

use crate::{MatchId, TeamSide};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Signal action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SignalAction {
    Buy,
    Pass,
}

impl fmt::Display for SignalAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => write!(f, "BUY"),
            Self::Pass => write!(f, "PASS"),
        }
    }
}

/// Result of evaluating one goal event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradingSignal {
    pub action: SignalAction,
    pub match_id: MatchId,
    pub team: String,
    pub side: TeamSide,
    /// Odds the decision was based on, if any were found.
    pub odds: Option<Decimal>,
    /// Normalized confidence in [0, 1]. Zero for PASS.
    pub signal_strength: Decimal,
    pub reason: String,
    pub timestamp: DateTime<Utc>,
}

impl TradingSignal {
    /// BUY signal.
    #[must_use]
    pub fn buy(
        match_id: MatchId,
        team: impl Into<String>,
        side: TeamSide,
        odds: Decimal,
        signal_strength: Decimal,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            action: SignalAction::Buy,
            match_id,
            team: team.into(),
            side,
            odds: Some(odds),
            signal_strength,
            reason: reason.into(),
            timestamp: Utc::now(),
        }
    }

    /// PASS signal.
    #[must_use]
    pub fn pass(
        match_id: MatchId,
        team: impl Into<String>,
        side: TeamSide,
        odds: Option<Decimal>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            action: SignalAction::Pass,
            match_id,
            team: team.into(),
            side,
            odds,
            signal_strength: Decimal::ZERO,
            reason: reason.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn is_buy(&self) -> bool {
        self.action == SignalAction::Buy
    }
}
