//! Positions and order results.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use underdog_core::{MatchId, TeamSide};

// ============================================================================
// Position
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionStatus {
    Open,
    Closed,
}

/// Settlement outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Win,
    Loss,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Win => "win",
            Self::Loss => "loss",
        }
    }
}

/// A simulated position on one side of a match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub order_id: u64,
    pub match_id: MatchId,
    pub team: String,
    pub side: TeamSide,
    /// Stake debited from the balance.
    pub entry_amount: Decimal,
    pub entry_odds: Decimal,
    pub entry_time: DateTime<Utc>,
    pub status: PositionStatus,
    pub outcome: Option<Outcome>,
    pub payout: Option<Decimal>,
    pub profit: Option<Decimal>,
}

impl Position {
    /// Total return if the position wins at entry odds.
    #[must_use]
    pub fn potential_payout(&self) -> Decimal {
        self.entry_amount * self.entry_odds
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.status == PositionStatus::Open
    }
}

// ============================================================================
// Order result
// ============================================================================

/// Why a BUY was not filled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RejectReason {
    /// Computed size is not positive or exceeds the balance.
    InsufficientBalance { required: Decimal, available: Decimal },
    /// An open position already references the match.
    PositionExists,
    /// The signal was not an actionable BUY.
    NotBuySignal,
}

impl RejectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InsufficientBalance { .. } => "insufficient_balance",
            Self::PositionExists => "position_exists",
            Self::NotBuySignal => "not_buy_signal",
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InsufficientBalance {
                required,
                available,
            } => write!(
                f,
                "insufficient_balance (required {required}, available {available})"
            ),
            other => write!(f, "{}", other.as_str()),
        }
    }
}

/// Result of `Ledger::execute_buy`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderResult {
    Filled(Position),
    Rejected { reason: RejectReason },
}

impl OrderResult {
    #[must_use]
    pub fn is_filled(&self) -> bool {
        matches!(self, Self::Filled(_))
    }

    pub fn position(&self) -> Option<&Position> {
        match self {
            Self::Filled(position) => Some(position),
            Self::Rejected { .. } => None,
        }
    }

    pub fn reject_reason(&self) -> Option<&RejectReason> {
        match self {
            Self::Filled(_) => None,
            Self::Rejected { reason } => Some(reason),
        }
    }
}
