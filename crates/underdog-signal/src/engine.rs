//! Underdog signal engine.
//!
//! Strategy: when the side that just scored was priced at or above the
//! underdog threshold, buy it. Strength scales linearly with the odds and
//! saturates at `full_strength_odds`.

use crate::cache::OddsCache;
use crate::config::SignalConfig;
use rust_decimal::Decimal;
use tracing::{debug, info, warn};
use underdog_api::DynFootballApi;
use underdog_core::{
    implied_probability, GoalEvent, MatchId, OddsQuote, SignalAction, TeamSide, TradingSignal,
};
use underdog_telemetry::Metrics;

/// Outcome of comparing a side's odds with the threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnderdogVerdict {
    /// No quote could be obtained for the match.
    NoOdds,
    /// The quote has no usable price for this side.
    Unknown,
    /// Priced below the threshold.
    Favorite(Decimal),
    /// Priced at or above the threshold.
    Underdog(Decimal),
}

impl UnderdogVerdict {
    pub fn is_underdog(&self) -> bool {
        matches!(self, Self::Underdog(_))
    }

    pub fn odds(&self) -> Option<Decimal> {
        match self {
            Self::Favorite(odds) | Self::Underdog(odds) => Some(*odds),
            Self::NoOdds | Self::Unknown => None,
        }
    }

    /// Metrics label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::NoOdds => "no_odds",
            Self::Unknown => "unknown",
            Self::Favorite(_) => "favorite",
            Self::Underdog(_) => "underdog",
        }
    }
}

/// Underdog signal engine.
pub struct UnderdogSignalEngine {
    api: DynFootballApi,
    cache: OddsCache,
    config: SignalConfig,
}

impl UnderdogSignalEngine {
    pub fn new(api: DynFootballApi, config: SignalConfig) -> Self {
        let cache = OddsCache::new(config.odds_ttl_secs);
        Self::with_cache(api, config, cache)
    }

    /// Create an engine with a prepared cache (e.g. one with an injected clock).
    pub fn with_cache(api: DynFootballApi, config: SignalConfig, cache: OddsCache) -> Self {
        Self { api, cache, config }
    }

    pub fn config(&self) -> &SignalConfig {
        &self.config
    }

    pub fn cache(&self) -> &OddsCache {
        &self.cache
    }

    /// Odds for a match, through the cache. `None` when the fetch failed or
    /// the bookmaker has no prices.
    pub async fn lookup_odds(&self, match_id: MatchId) -> Option<OddsQuote> {
        let api = &self.api;
        match self
            .cache
            .get_or_fetch(match_id, || api.odds(match_id))
            .await
        {
            Ok(quote) if !quote.is_empty() => Some(quote),
            Ok(_) => {
                debug!(%match_id, "No odds published");
                None
            }
            Err(e) => {
                warn!(%match_id, error = %e, "Odds lookup failed");
                None
            }
        }
    }

    /// Classify a side of a match.
    pub async fn classify(&self, match_id: MatchId, side: TeamSide) -> UnderdogVerdict {
        let quote = self.lookup_odds(match_id).await;
        self.verdict(quote.as_ref(), side)
    }

    /// Compare a quote's price for `side` with the threshold.
    pub fn verdict(&self, quote: Option<&OddsQuote>, side: TeamSide) -> UnderdogVerdict {
        let Some(quote) = quote else {
            return UnderdogVerdict::NoOdds;
        };
        match quote.odds_for(side) {
            None => UnderdogVerdict::Unknown,
            Some(odds) if odds <= Decimal::ZERO => UnderdogVerdict::Unknown,
            Some(odds) if odds >= self.config.underdog_threshold => UnderdogVerdict::Underdog(odds),
            Some(odds) => UnderdogVerdict::Favorite(odds),
        }
    }

    /// `min(odds / full_strength_odds, 1)`.
    pub fn signal_strength(&self, odds: Decimal) -> Decimal {
        (odds / self.config.full_strength_odds).min(Decimal::ONE)
    }

    /// Evaluate a goal event.
    pub async fn evaluate(&self, goal: &GoalEvent) -> TradingSignal {
        let verdict = self.classify(goal.match_id, goal.side).await;
        let threshold = self.config.underdog_threshold;

        let signal = match verdict {
            UnderdogVerdict::NoOdds => {
                TradingSignal::pass(goal.match_id, &goal.scoring_team, goal.side, None, "no odds")
            }
            UnderdogVerdict::Unknown => TradingSignal::pass(
                goal.match_id,
                &goal.scoring_team,
                goal.side,
                None,
                "favorite/unknown: no price for scoring side",
            ),
            UnderdogVerdict::Favorite(odds) => TradingSignal::pass(
                goal.match_id,
                &goal.scoring_team,
                goal.side,
                Some(odds),
                format!("favorite/unknown: odds {odds} < threshold {threshold}"),
            ),
            UnderdogVerdict::Underdog(odds) => {
                let strength = self.signal_strength(odds);
                TradingSignal::buy(
                    goal.match_id,
                    &goal.scoring_team,
                    goal.side,
                    odds,
                    strength,
                    format!(
                        "underdog {} scored at {}-{}: odds {odds} >= threshold {threshold}",
                        goal.scoring_team, goal.home_score, goal.away_score
                    ),
                )
            }
        };

        let action = signal.action.to_string();
        match signal.action {
            SignalAction::Buy => info!(
                match_id = %goal.match_id,
                team = %goal.scoring_team,
                side = %goal.side,
                odds = ?signal.odds,
                implied_prob = ?signal.odds.map(implied_probability),
                strength = %signal.signal_strength,
                "Underdog goal, BUY signal"
            ),
            SignalAction::Pass => debug!(
                match_id = %goal.match_id,
                team = %goal.scoring_team,
                verdict = verdict.label(),
                reason = %signal.reason,
                "PASS"
            ),
        }
        Metrics::signal_evaluated(&action, verdict.label());

        signal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use std::sync::Arc;
    use underdog_api::MockFootballApi;

    fn engine_with(api: Arc<MockFootballApi>) -> UnderdogSignalEngine {
        UnderdogSignalEngine::new(api, SignalConfig::default())
    }

    fn quote(match_id: u64, home: Option<Decimal>, away: Option<Decimal>) -> OddsQuote {
        OddsQuote {
            match_id: MatchId::new(match_id),
            home_odds: home,
            draw_odds: Some(dec!(3.3)),
            away_odds: away,
            fetched_at: Utc::now(),
        }
    }

    fn away_goal(match_id: u64) -> GoalEvent {
        GoalEvent::new(MatchId::new(match_id), "Getafe", TeamSide::Away, Some(71), 0, 1)
    }

    async fn evaluate_away_odds(odds: Decimal) -> TradingSignal {
        let api = Arc::new(MockFootballApi::new());
        api.set_odds(quote(1, Some(dec!(1.6)), Some(odds)));
        engine_with(api).evaluate(&away_goal(1)).await
    }

    #[tokio::test]
    async fn test_below_threshold_passes() {
        let signal = evaluate_away_odds(dec!(2.4)).await;
        assert_eq!(signal.action, SignalAction::Pass);
        assert_eq!(signal.odds, Some(dec!(2.4)));
        assert!(signal.reason.contains("2.4"));
        assert!(signal.reason.contains("2.5"));
    }

    #[tokio::test]
    async fn test_at_threshold_buys() {
        let signal = evaluate_away_odds(dec!(2.5)).await;
        assert_eq!(signal.action, SignalAction::Buy);
        assert_eq!(signal.signal_strength, dec!(0.5));
        assert_eq!(signal.team, "Getafe");
        assert_eq!(signal.side, TeamSide::Away);
    }

    #[tokio::test]
    async fn test_strength_saturates() {
        assert_eq!(evaluate_away_odds(dec!(5.0)).await.signal_strength, Decimal::ONE);
        assert_eq!(evaluate_away_odds(dec!(10.0)).await.signal_strength, Decimal::ONE);
    }

    #[tokio::test]
    async fn test_no_odds_passes() {
        let api = Arc::new(MockFootballApi::new());
        let signal = engine_with(api).evaluate(&away_goal(2)).await;
        assert_eq!(signal.action, SignalAction::Pass);
        assert_eq!(signal.reason, "no odds");
    }

    #[tokio::test]
    async fn test_odds_failure_passes() {
        let api = Arc::new(MockFootballApi::new());
        api.set_odds(quote(3, Some(dec!(1.2)), Some(dec!(9.0))));
        api.set_fail_odds(true);
        let signal = engine_with(api).evaluate(&away_goal(3)).await;
        assert_eq!(signal.reason, "no odds");
    }

    #[tokio::test]
    async fn test_missing_side_is_unknown() {
        let api = Arc::new(MockFootballApi::new());
        api.set_odds(quote(4, Some(dec!(1.9)), None));
        let engine = engine_with(api);

        assert_eq!(
            engine.classify(MatchId::new(4), TeamSide::Away).await,
            UnderdogVerdict::Unknown
        );
        let signal = engine.evaluate(&away_goal(4)).await;
        assert_eq!(signal.action, SignalAction::Pass);
        assert!(signal.reason.starts_with("favorite/unknown"));
    }

    #[tokio::test]
    async fn test_zero_odds_is_unknown() {
        let api = Arc::new(MockFootballApi::new());
        let engine = engine_with(api);
        let q = quote(5, Some(dec!(0)), Some(dec!(4)));
        assert_eq!(engine.verdict(Some(&q), TeamSide::Home), UnderdogVerdict::Unknown);
        assert_eq!(
            engine.verdict(Some(&q), TeamSide::Away),
            UnderdogVerdict::Underdog(dec!(4))
        );
        assert_eq!(engine.verdict(None, TeamSide::Away), UnderdogVerdict::NoOdds);
    }

    #[tokio::test]
    async fn test_odds_fetched_once_per_match() {
        let api = Arc::new(MockFootballApi::new());
        api.set_odds(quote(6, Some(dec!(1.3)), Some(dec!(8.0))));
        let engine = engine_with(api.clone());

        engine.evaluate(&away_goal(6)).await;
        engine.evaluate(&away_goal(6)).await;
        engine.classify(MatchId::new(6), TeamSide::Home).await;
        assert_eq!(api.odds_calls(), 1);
    }
}
