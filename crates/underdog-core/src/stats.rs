//! Ledger performance snapshot.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Point-in-time performance of the simulated ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerformanceStats {
    pub initial_balance: Decimal,
    pub current_balance: Decimal,
    /// `current_balance - initial_balance`.
    pub pnl: Decimal,
    pub total_trades: u64,
    pub winning_trades: u64,
    pub losing_trades: u64,
    /// `winning_trades / total_trades`, zero when nothing traded.
    pub win_rate: Decimal,
    pub open_positions: usize,
}

impl PerformanceStats {
    /// pnl as a percentage of the initial balance.
    pub fn return_pct(&self) -> Decimal {
        if self.initial_balance.is_zero() {
            return Decimal::ZERO;
        }
        self.pnl / self.initial_balance * Decimal::ONE_HUNDRED
    }
}
