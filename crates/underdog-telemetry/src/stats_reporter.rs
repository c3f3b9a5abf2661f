//! Periodic performance summary.
//!
//! Combines the ledger's `PerformanceStats` with counters read back from the
//! Prometheus registry and writes a block of log lines.

use crate::metrics::{
    API_REQUESTS_TOTAL, CYCLE_ERRORS_TOTAL, GOALS_DETECTED_TOTAL, ORDERS_TOTAL, SIGNALS_TOTAL,
};
use chrono::{DateTime, Utc};
use prometheus::core::Collector;
use prometheus::CounterVec;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::info;
use underdog_core::PerformanceStats;

/// Counter totals since process start.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CounterSummary {
    pub api_requests: u64,
    pub api_failures: u64,
    pub goals_home: u64,
    pub goals_away: u64,
    pub signals_buy: u64,
    pub signals_pass: u64,
    pub orders_filled: u64,
    pub orders_rejected: u64,
    pub cycle_errors: u64,
}

/// Performance summary reporter.
pub struct StatsReporter {
    start_time: DateTime<Utc>,
}

impl Default for StatsReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl StatsReporter {
    pub fn new() -> Self {
        Self {
            start_time: Utc::now(),
        }
    }

    /// Read counter totals from the registry.
    pub fn counters(&self) -> CounterSummary {
        let api_requests = sum_counter(&API_REQUESTS_TOTAL, None);
        let api_ok = sum_counter(&API_REQUESTS_TOTAL, Some(("outcome", "ok")));

        CounterSummary {
            api_requests,
            api_failures: api_requests.saturating_sub(api_ok),
            goals_home: sum_counter(&GOALS_DETECTED_TOTAL, Some(("side", "home"))),
            goals_away: sum_counter(&GOALS_DETECTED_TOTAL, Some(("side", "away"))),
            signals_buy: sum_counter(&SIGNALS_TOTAL, Some(("action", "BUY"))),
            signals_pass: sum_counter(&SIGNALS_TOTAL, Some(("action", "PASS"))),
            orders_filled: sum_counter(&ORDERS_TOTAL, Some(("status", "filled"))),
            orders_rejected: sum_counter(&ORDERS_TOTAL, Some(("status", "rejected"))),
            cycle_errors: sum_counter(&CYCLE_ERRORS_TOTAL, None),
        }
    }

    /// Write the performance summary to logs.
    pub fn output_summary(&self, stats: &PerformanceStats) {
        let counters = self.counters();
        let duration = Utc::now() - self.start_time;
        let hours = duration.num_hours();
        let minutes = duration.num_minutes() % 60;

        info!("============ Performance Summary ============");
        info!(
            "Running since {} ({} hours {} minutes)",
            self.start_time.format("%Y-%m-%d %H:%M:%S UTC"),
            hours,
            minutes
        );
        info!(
            "  Balance: {} (initial {}, P&L {}, {:.2}%)",
            stats.current_balance,
            stats.initial_balance,
            stats.pnl,
            stats.return_pct()
        );
        info!(
            "  Trades: {} (won {}, lost {}, win rate {:.1}%), open positions: {}",
            stats.total_trades,
            stats.winning_trades,
            stats.losing_trades,
            stats.win_rate * Decimal::ONE_HUNDRED,
            stats.open_positions
        );
        info!(
            "  Goals: {} (home {}, away {})",
            counters.goals_home + counters.goals_away,
            counters.goals_home,
            counters.goals_away
        );
        info!(
            "  Signals: BUY {}, PASS {}; orders filled {}, rejected {}",
            counters.signals_buy,
            counters.signals_pass,
            counters.orders_filled,
            counters.orders_rejected
        );
        info!(
            "  API requests: {} ({} failed), cycle errors: {}",
            counters.api_requests, counters.api_failures, counters.cycle_errors
        );
        info!("=============================================");
    }
}

/// Sum a counter vec across all label sets, optionally restricted to one label value.
fn sum_counter(counter: &CounterVec, filter: Option<(&str, &str)>) -> u64 {
    let mut total = 0.0;
    for mf in counter.collect() {
        for m in mf.get_metric() {
            let matches = match filter {
                None => true,
                Some((name, value)) => m
                    .get_label()
                    .iter()
                    .any(|pair| pair.get_name() == name && pair.get_value() == value),
            };
            if matches {
                total += m.get_counter().get_value();
            }
        }
    }
    total as u64
}
