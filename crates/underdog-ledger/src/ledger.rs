//! Paper-trading ledger.
//!
//! One mutex guards the whole state, so the checks and the debit in
//! `execute_buy` are a single step: two concurrent BUYs for the same match
//! cannot both fill.

use crate::config::LedgerConfig;
use crate::error::{LedgerError, LedgerResult};
use crate::position::{OrderResult, Outcome, Position, PositionStatus, RejectReason};
use chrono::Utc;
use parking_lot::Mutex;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::collections::HashMap;
use tracing::{debug, info};
use underdog_core::{MatchId, PerformanceStats, SignalAction, TradingSignal};
use underdog_telemetry::Metrics;

#[derive(Debug)]
struct LedgerState {
    balance: Decimal,
    total_trades: u64,
    winning_trades: u64,
    losing_trades: u64,
    next_order_id: u64,
    open: HashMap<MatchId, Position>,
    /// Every filled order, in fill order, as it was at entry.
    history: Vec<Position>,
    closed: Vec<Position>,
}

/// Simulated executor.
#[derive(Debug)]
pub struct Ledger {
    config: LedgerConfig,
    state: Mutex<LedgerState>,
}

impl Ledger {
    pub fn new(config: LedgerConfig) -> Self {
        let state = LedgerState {
            balance: config.initial_balance,
            total_trades: 0,
            winning_trades: 0,
            losing_trades: 0,
            next_order_id: 1,
            open: HashMap::new(),
            history: Vec::new(),
            closed: Vec::new(),
        };
        Self {
            config,
            state: Mutex::new(state),
        }
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// `min(max_position_size * strength, balance * max_balance_fraction, max_position_size)`.
    pub fn position_size(&self, signal_strength: Decimal, balance: Decimal) -> Decimal {
        let max = self.config.max_position_size;
        (max * signal_strength)
            .min(balance * self.config.max_balance_fraction)
            .min(max)
    }

    /// Try to open a position for a BUY signal.
    pub fn execute_buy(&self, signal: &TradingSignal) -> OrderResult {
        let (result, open_count, balance) = {
            let mut state = self.state.lock();
            let result = self.fill_locked(&mut state, signal);
            (result, state.open.len(), state.balance)
        };

        match &result {
            OrderResult::Filled(position) => {
                info!(
                    order_id = position.order_id,
                    match_id = %position.match_id,
                    team = %position.team,
                    side = %position.side,
                    amount = %position.entry_amount,
                    odds = %position.entry_odds,
                    balance = %balance,
                    "Order filled"
                );
                Metrics::order_filled();
            }
            OrderResult::Rejected { reason } => {
                info!(match_id = %signal.match_id, %reason, "Order rejected");
                Metrics::order_rejected(reason.as_str());
            }
        }
        Metrics::ledger_state(open_count, balance.to_f64().unwrap_or_default());

        result
    }

    fn fill_locked(&self, state: &mut LedgerState, signal: &TradingSignal) -> OrderResult {
        let odds = match (signal.action, signal.odds) {
            (SignalAction::Buy, Some(odds)) => odds,
            _ => {
                return OrderResult::Rejected {
                    reason: RejectReason::NotBuySignal,
                }
            }
        };

        let size = self.position_size(signal.signal_strength, state.balance);
        if size <= Decimal::ZERO || size > state.balance {
            return OrderResult::Rejected {
                reason: RejectReason::InsufficientBalance {
                    required: size,
                    available: state.balance,
                },
            };
        }

        if state.open.contains_key(&signal.match_id) {
            return OrderResult::Rejected {
                reason: RejectReason::PositionExists,
            };
        }

        let order_id = state.next_order_id;
        state.next_order_id += 1;

        let position = Position {
            order_id,
            match_id: signal.match_id,
            team: signal.team.clone(),
            side: signal.side,
            entry_amount: size,
            entry_odds: odds,
            entry_time: Utc::now(),
            status: PositionStatus::Open,
            outcome: None,
            payout: None,
            profit: None,
        };

        state.balance -= size;
        state.total_trades += 1;
        state.open.insert(signal.match_id, position.clone());
        state.history.push(position.clone());

        OrderResult::Filled(position)
    }

    /// Settle the open position on a match.
    ///
    /// A win credits `payout` (total return including stake); a loss credits
    /// nothing.
    pub fn close_position(
        &self,
        match_id: MatchId,
        outcome: Outcome,
        payout: Decimal,
    ) -> LedgerResult<Position> {
        let mut state = self.state.lock();
        let mut position = state
            .open
            .remove(&match_id)
            .ok_or(LedgerError::NotFound(match_id))?;

        let (payout, profit) = match outcome {
            Outcome::Win => {
                state.balance += payout;
                state.winning_trades += 1;
                (payout, payout - position.entry_amount)
            }
            Outcome::Loss => {
                state.losing_trades += 1;
                (Decimal::ZERO, -position.entry_amount)
            }
        };

        position.status = PositionStatus::Closed;
        position.outcome = Some(outcome);
        position.payout = Some(payout);
        position.profit = Some(profit);
        state.closed.push(position.clone());

        info!(
            order_id = position.order_id,
            %match_id,
            outcome = outcome.as_str(),
            %profit,
            balance = %state.balance,
            "Position closed"
        );
        Metrics::position_closed(outcome.as_str());
        Metrics::ledger_state(state.open.len(), state.balance.to_f64().unwrap_or_default());

        Ok(position)
    }

    /// Performance snapshot.
    pub fn get_performance_stats(&self) -> PerformanceStats {
        let state = self.state.lock();
        let win_rate = if state.total_trades > 0 {
            Decimal::from(state.winning_trades) / Decimal::from(state.total_trades)
        } else {
            Decimal::ZERO
        };

        PerformanceStats {
            initial_balance: self.config.initial_balance,
            current_balance: state.balance,
            pnl: state.balance - self.config.initial_balance,
            total_trades: state.total_trades,
            winning_trades: state.winning_trades,
            losing_trades: state.losing_trades,
            win_rate,
            open_positions: state.open.len(),
        }
    }

    pub fn balance(&self) -> Decimal {
        self.state.lock().balance
    }

    /// Open positions ordered by order id.
    pub fn open_positions(&self) -> Vec<Position> {
        let mut positions: Vec<_> = self.state.lock().open.values().cloned().collect();
        positions.sort_by_key(|p| p.order_id);
        positions
    }

    pub fn has_open_position(&self, match_id: MatchId) -> bool {
        self.state.lock().open.contains_key(&match_id)
    }

    /// Filled orders as they were at entry.
    pub fn order_history(&self) -> Vec<Position> {
        self.state.lock().history.clone()
    }

    pub fn closed_positions(&self) -> Vec<Position> {
        self.state.lock().closed.clone()
    }

    /// Log open positions.
    pub fn log_open_positions(&self) {
        for position in self.open_positions() {
            debug!(
                order_id = position.order_id,
                match_id = %position.match_id,
                team = %position.team,
                amount = %position.entry_amount,
                odds = %position.entry_odds,
                potential = %position.potential_payout(),
                "Open position"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::sync::Arc;
    use underdog_core::TeamSide;

    fn buy(match_id: u64, odds: Decimal, strength: Decimal) -> TradingSignal {
        TradingSignal::buy(
            MatchId::new(match_id),
            "Cadiz",
            TeamSide::Home,
            odds,
            strength,
            "underdog",
        )
    }

    #[test]
    fn test_position_sizing_capped_by_balance_fraction() {
        let ledger = Ledger::new(LedgerConfig::new(dec!(1000), dec!(50)));

        let result = ledger.execute_buy(&buy(1, dec!(4.0), dec!(0.8)));

        let position = result.position().unwrap();
        assert_eq!(position.entry_amount, dec!(20));
        assert_eq!(position.order_id, 1);
        assert_eq!(ledger.balance(), dec!(980));
    }

    #[test]
    fn test_position_sizing_by_strength() {
        let ledger = Ledger::new(LedgerConfig::default());
        // 100 * 0.5 = 50 < 10000 * 0.02 = 200
        let result = ledger.execute_buy(&buy(1, dec!(2.5), dec!(0.5)));
        assert_eq!(result.position().unwrap().entry_amount, dec!(50));
        assert_eq!(ledger.balance(), dec!(9950));
    }

    #[test]
    fn test_duplicate_match_rejected() {
        let ledger = Ledger::new(LedgerConfig::new(dec!(1000), dec!(50)));

        assert!(ledger.execute_buy(&buy(7, dec!(3.0), dec!(0.6))).is_filled());
        let second = ledger.execute_buy(&buy(7, dec!(3.0), dec!(0.6)));

        assert_eq!(second.reject_reason(), Some(&RejectReason::PositionExists));
        assert_eq!(ledger.balance(), dec!(980));
        assert_eq!(ledger.get_performance_stats().total_trades, 1);
    }

    #[test]
    fn test_pass_signal_rejected() {
        let ledger = Ledger::new(LedgerConfig::default());
        let pass = TradingSignal::pass(MatchId::new(1), "Cadiz", TeamSide::Home, None, "no odds");

        let result = ledger.execute_buy(&pass);
        assert_eq!(result.reject_reason(), Some(&RejectReason::NotBuySignal));
        assert_eq!(ledger.balance(), dec!(10000));
    }

    #[test]
    fn test_zero_strength_is_insufficient_balance() {
        let ledger = Ledger::new(LedgerConfig::default());
        let result = ledger.execute_buy(&buy(1, dec!(3.0), dec!(0)));
        assert!(matches!(
            result.reject_reason(),
            Some(RejectReason::InsufficientBalance { .. })
        ));
    }

    #[test]
    fn test_order_ids_increase() {
        let ledger = Ledger::new(LedgerConfig::default());
        for id in 1..=3 {
            ledger.execute_buy(&buy(id, dec!(3.0), dec!(1)));
        }
        let ids: Vec<_> = ledger.order_history().iter().map(|p| p.order_id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(ledger.open_positions().len(), 3);
    }

    #[test]
    fn test_close_win() {
        let ledger = Ledger::new(LedgerConfig::new(dec!(1000), dec!(50)));
        ledger.execute_buy(&buy(1, dec!(4.0), dec!(0.8)));

        let closed = ledger
            .close_position(MatchId::new(1), Outcome::Win, dec!(80))
            .unwrap();

        assert_eq!(closed.status, PositionStatus::Closed);
        assert_eq!(closed.profit, Some(dec!(60)));
        assert_eq!(ledger.balance(), dec!(1060));
        assert!(!ledger.has_open_position(MatchId::new(1)));

        let stats = ledger.get_performance_stats();
        assert_eq!(stats.pnl, dec!(60));
        assert_eq!(stats.winning_trades, 1);
        assert_eq!(stats.win_rate, dec!(1));
    }

    #[test]
    fn test_close_loss() {
        let ledger = Ledger::new(LedgerConfig::new(dec!(1000), dec!(50)));
        ledger.execute_buy(&buy(1, dec!(4.0), dec!(0.8)));
        ledger.execute_buy(&buy(2, dec!(4.0), dec!(0.8)));

        let closed = ledger
            .close_position(MatchId::new(2), Outcome::Loss, dec!(0))
            .unwrap();
        assert_eq!(closed.profit, Some(-closed.entry_amount));

        let stats = ledger.get_performance_stats();
        assert_eq!(stats.losing_trades, 1);
        assert_eq!(stats.open_positions, 1);
        assert_eq!(stats.win_rate, dec!(0));
        assert_eq!(stats.pnl, stats.current_balance - dec!(1000));
        assert_eq!(ledger.closed_positions().len(), 1);
    }

    #[test]
    fn test_close_not_found() {
        let ledger = Ledger::new(LedgerConfig::default());
        let result = ledger.close_position(MatchId::new(99), Outcome::Win, dec!(10));
        assert!(matches!(result, Err(LedgerError::NotFound(_))));
    }

    #[test]
    fn test_reopen_after_close() {
        let ledger = Ledger::new(LedgerConfig::default());
        ledger.execute_buy(&buy(1, dec!(3.0), dec!(1)));
        ledger
            .close_position(MatchId::new(1), Outcome::Loss, dec!(0))
            .unwrap();
        assert!(ledger.execute_buy(&buy(1, dec!(3.0), dec!(1))).is_filled());
    }

    #[test]
    fn test_stats_without_trades() {
        let ledger = Ledger::new(LedgerConfig::default());
        let stats = ledger.get_performance_stats();
        assert_eq!(stats.pnl, dec!(0));
        assert_eq!(stats.win_rate, dec!(0));
    }

    #[test]
    fn test_concurrent_buys_fill_once() {
        let ledger = Arc::new(Ledger::new(LedgerConfig::default()));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let ledger = ledger.clone();
                std::thread::spawn(move || ledger.execute_buy(&buy(5, dec!(3.0), dec!(1))))
            })
            .collect();

        let filled = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(OrderResult::is_filled)
            .count();

        assert_eq!(filled, 1);
        assert_eq!(ledger.balance(), dec!(9900));
    }
}
