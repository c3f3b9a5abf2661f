//! Prometheus metrics for the underdog bot.
//!
//! # Panics
//!
//! Metric registration uses `unwrap()`. A failure means duplicate metric
//! names, which is a startup bug; it only happens during static
//! initialization.

use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_gauge, register_histogram_vec, register_int_gauge,
    CounterVec, Gauge, HistogramVec, IntGauge,
};

/// API requests by endpoint and outcome (ok/http_error/provider_error/malformed).
pub static API_REQUESTS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "underdog_api_requests_total",
        "Total API-Football requests",
        &["endpoint", "outcome"]
    )
    .unwrap()
});

/// Time spent suspended in the rate limiter.
pub static RATE_LIMIT_WAIT_MS: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "underdog_rate_limit_wait_ms",
        "Rate limiter suspension in milliseconds",
        &["limiter"],
        vec![100.0, 500.0, 1000.0, 5000.0, 10000.0, 30000.0, 60000.0]
    )
    .unwrap()
});

/// Goals detected by scoring side.
pub static GOALS_DETECTED_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "underdog_goals_detected_total",
        "Total goal events emitted",
        &["side"]
    )
    .unwrap()
});

/// Signals by action and verdict.
pub static SIGNALS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "underdog_signals_total",
        "Total trading signals evaluated",
        &["action", "verdict"]
    )
    .unwrap()
});

/// Odds cache lookups (hit/miss).
pub static ODDS_CACHE_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "underdog_odds_cache_total",
        "Odds cache lookups",
        &["result"]
    )
    .unwrap()
});

/// Orders by status (filled/rejected) and reject reason ("" when filled).
pub static ORDERS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "underdog_orders_total",
        "Total simulated orders",
        &["status", "reason"]
    )
    .unwrap()
});

/// Positions closed by outcome.
pub static POSITIONS_CLOSED_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "underdog_positions_closed_total",
        "Total settled positions",
        &["outcome"]
    )
    .unwrap()
});

/// Scan cycle failures by stage.
pub static CYCLE_ERRORS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "underdog_cycle_errors_total",
        "Total scan cycle errors",
        &["stage"]
    )
    .unwrap()
});

/// Matches currently tracked.
pub static TRACKED_MATCHES: Lazy<IntGauge> = Lazy::new(|| {
    register_int_gauge!("underdog_tracked_matches", "Matches currently tracked").unwrap()
});

/// Open positions.
pub static OPEN_POSITIONS: Lazy<IntGauge> = Lazy::new(|| {
    register_int_gauge!("underdog_open_positions", "Open simulated positions").unwrap()
});

/// Ledger balance.
pub static BALANCE: Lazy<Gauge> =
    Lazy::new(|| register_gauge!("underdog_balance", "Simulated ledger balance").unwrap());

/// Metrics recording helpers.
pub struct Metrics;

impl Metrics {
    /// Record an API request outcome.
    pub fn api_request(endpoint: &str, outcome: &str) {
        API_REQUESTS_TOTAL
            .with_label_values(&[endpoint, outcome])
            .inc();
    }

    /// Record a rate limiter suspension.
    pub fn rate_limit_wait(limiter: &str, wait_ms: f64) {
        RATE_LIMIT_WAIT_MS
            .with_label_values(&[limiter])
            .observe(wait_ms);
    }

    /// Record an emitted goal.
    pub fn goal_detected(side: &str) {
        GOALS_DETECTED_TOTAL.with_label_values(&[side]).inc();
    }

    /// Record an evaluated signal.
    pub fn signal_evaluated(action: &str, verdict: &str) {
        SIGNALS_TOTAL.with_label_values(&[action, verdict]).inc();
    }

    /// Record an odds cache hit.
    pub fn odds_cache_hit() {
        ODDS_CACHE_TOTAL.with_label_values(&["hit"]).inc();
    }

    /// Record an odds cache miss.
    pub fn odds_cache_miss() {
        ODDS_CACHE_TOTAL.with_label_values(&["miss"]).inc();
    }

    /// Record a filled order.
    pub fn order_filled() {
        ORDERS_TOTAL.with_label_values(&["filled", ""]).inc();
    }

    /// Record a rejected order.
    pub fn order_rejected(reason: &str) {
        ORDERS_TOTAL.with_label_values(&["rejected", reason]).inc();
    }

    /// Record a settled position.
    pub fn position_closed(outcome: &str) {
        POSITIONS_CLOSED_TOTAL.with_label_values(&[outcome]).inc();
    }

    /// Record a failed cycle stage.
    pub fn cycle_error(stage: &str) {
        CYCLE_ERRORS_TOTAL.with_label_values(&[stage]).inc();
    }

    /// Set tracked match count.
    pub fn tracked_matches(count: usize) {
        TRACKED_MATCHES.set(count as i64);
    }

    /// Set open position count and balance.
    pub fn ledger_state(open_positions: usize, balance: f64) {
        OPEN_POSITIONS.set(open_positions as i64);
        BALANCE.set(balance);
    }
}
