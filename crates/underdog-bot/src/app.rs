//! Main application orchestrator.

use crate::config::AppConfig;
use crate::error::AppResult;
use chrono::NaiveDate;
use std::sync::Arc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};
use underdog_api::{DynFootballApi, HttpFootballApi, RateLimiter};
use underdog_core::{league_name, PerformanceStats, TeamSide};
use underdog_ledger::{Ledger, OrderResult};
use underdog_signal::UnderdogSignalEngine;
use underdog_telemetry::StatsReporter;
use underdog_tracker::MatchTracker;

/// What one scan cycle did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub goals: usize,
    pub buy_signals: usize,
    pub filled: usize,
    pub rejected: usize,
}

/// Main application.
pub struct Application {
    config: AppConfig,
    api: DynFootballApi,
    tracker: MatchTracker,
    engine: UnderdogSignalEngine,
    ledger: Arc<Ledger>,
    stats: StatsReporter,
}

impl Application {
    /// Create the application against the live API.
    ///
    /// One rate limiter is shared by every request the process makes.
    pub fn new(config: AppConfig) -> AppResult<Self> {
        let limiter = Arc::new(RateLimiter::per_minute(config.api.rate_limit_per_minute));
        let api: DynFootballApi = Arc::new(HttpFootballApi::new(
            config.api.to_api_config(),
            limiter,
        )?);
        Ok(Self::with_api(config, api))
    }

    /// Create the application over any `FootballApi`.
    pub fn with_api(config: AppConfig, api: DynFootballApi) -> Self {
        let tracker = MatchTracker::new(api.clone(), config.tracker.league_ids());
        let engine = UnderdogSignalEngine::new(api.clone(), config.signal.clone());
        let ledger = Arc::new(Ledger::new(config.ledger.clone()));

        Self {
            config,
            api,
            tracker,
            engine,
            ledger,
            stats: StatsReporter::new(),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn ledger(&self) -> &Arc<Ledger> {
        &self.ledger
    }

    pub fn tracker(&self) -> &MatchTracker {
        &self.tracker
    }

    pub fn performance_stats(&self) -> PerformanceStats {
        self.ledger.get_performance_stats()
    }

    /// One pass: scan for goals, evaluate each, paper-trade BUY signals.
    ///
    /// Never fails; fetch problems surface as an empty goal list.
    pub async fn run_cycle(&self) -> CycleReport {
        let goals = self.tracker.scan_for_goals().await;
        let mut report = CycleReport {
            goals: goals.len(),
            ..Default::default()
        };

        for goal in &goals {
            let signal = self.engine.evaluate(goal).await;
            if !signal.is_buy() {
                continue;
            }
            report.buy_signals += 1;

            match self.ledger.execute_buy(&signal) {
                OrderResult::Filled(_) => report.filled += 1,
                OrderResult::Rejected { .. } => report.rejected += 1,
            }
        }

        let pruned = self.tracker.prune_stale(self.config.stale_after());
        let expired = self.engine.cache().purge_expired();
        if pruned > 0 || expired > 0 {
            debug!(pruned, expired, "Housekeeping");
        }

        if report.goals > 0 {
            info!(
                goals = report.goals,
                buys = report.buy_signals,
                filled = report.filled,
                rejected = report.rejected,
                "Cycle complete"
            );
        }
        report
    }

    /// Poll until Ctrl+C.
    pub async fn run(self) -> AppResult<()> {
        info!(
            leagues = ?self.tracker.leagues(),
            poll_interval_secs = self.config.app.poll_interval_secs,
            threshold = %self.config.signal.underdog_threshold,
            balance = %self.config.ledger.initial_balance,
            "Starting application"
        );

        let mut poll_interval = tokio::time::interval(self.config.poll_interval());
        poll_interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut stats_interval = tokio::time::interval(self.config.stats_interval());
        // Skip the immediate first tick.
        stats_interval.tick().await;

        let mut cycles = 0u64;
        loop {
            tokio::select! {
                _ = poll_interval.tick() => {
                    cycles += 1;
                    self.run_cycle().await;
                }

                _ = stats_interval.tick() => {
                    self.stats.output_summary(&self.performance_stats());
                    self.ledger.log_open_positions();
                }

                result = tokio::signal::ctrl_c() => {
                    if let Err(e) = result {
                        warn!(error = %e, "Failed to listen for shutdown signal");
                    }
                    info!("Shutdown signal received");
                    break;
                }
            }
        }

        info!(cycles, "Shutting down");
        info!("Final statistics summary:");
        self.stats.output_summary(&self.performance_stats());
        self.ledger.log_open_positions();

        Ok(())
    }

    /// One-shot demo: list the day's fixtures with odds, then run a cycle.
    pub async fn scan_once(&self, date: NaiveDate) -> AppResult<CycleReport> {
        let fixtures = self.tracker.fixtures_by_date(date).await?;
        info!(%date, count = fixtures.len(), "Fixtures in tracked leagues");

        for fixture in &fixtures {
            let league = fixture
                .league_id
                .and_then(league_name)
                .unwrap_or("Unknown league");
            // Finished fixtures are listed without spending an odds request.
            let quote = if fixture.status.is_finished() {
                None
            } else {
                self.engine.lookup_odds(fixture.match_id).await
            };
            let home = self.engine.verdict(quote.as_ref(), TeamSide::Home);
            let away = self.engine.verdict(quote.as_ref(), TeamSide::Away);

            info!(
                match_id = %fixture.match_id,
                league,
                status = %fixture.status,
                home_odds = ?home.odds(),
                away_odds = ?away.odds(),
                "{}{} {}-{} {}{}",
                fixture.home_team,
                if home.is_underdog() { " [UNDERDOG]" } else { "" },
                fixture.home_score,
                fixture.away_score,
                fixture.away_team,
                if away.is_underdog() { " [UNDERDOG]" } else { "" }
            );
        }

        let report = self.run_cycle().await;
        self.stats.output_summary(&self.performance_stats());
        Ok(report)
    }

    /// Connectivity check against `/timezone`.
    pub async fn check_connection(&self) -> AppResult<usize> {
        let count = self.api.timezones().await?;
        info!(timezones = count, "API connection OK");
        Ok(count)
    }
}
