//! Match Winner odds.

use crate::{MatchId, TeamSide};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Decimal odds for the three Match Winner outcomes of one fixture.
///
/// Odds are payout multiples (>= 1.0). Any side may be absent when the
/// bookmaker did not price it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OddsQuote {
    pub match_id: MatchId,
    pub home_odds: Option<Decimal>,
    pub draw_odds: Option<Decimal>,
    pub away_odds: Option<Decimal>,
    pub fetched_at: DateTime<Utc>,
}

impl OddsQuote {
    /// Quote with no prices.
    pub fn empty(match_id: MatchId, fetched_at: DateTime<Utc>) -> Self {
        Self {
            match_id,
            home_odds: None,
            draw_odds: None,
            away_odds: None,
            fetched_at,
        }
    }

    /// Odds for a team side.
    pub fn odds_for(&self, side: TeamSide) -> Option<Decimal> {
        match side {
            TeamSide::Home => self.home_odds,
            TeamSide::Away => self.away_odds,
        }
    }

    /// True when no outcome carries a price.
    pub fn is_empty(&self) -> bool {
        self.home_odds.is_none() && self.draw_odds.is_none() && self.away_odds.is_none()
    }

    /// Set odds for a label as the provider names it ("Home", "Draw", "Away").
    /// Unknown labels are ignored.
    pub fn set_by_label(&mut self, label: &str, odds: Decimal) {
        match label {
            "Home" => self.home_odds = Some(odds),
            "Draw" => self.draw_odds = Some(odds),
            "Away" => self.away_odds = Some(odds),
            _ => {}
        }
    }
}

/// Parse a decimal odds string as quoted by bookmakers ("2.75").
///
/// Odds below 1.0 are not a valid payout multiple.
pub fn parse_decimal_odds(raw: &str) -> crate::Result<Decimal> {
    let odds = Decimal::from_str(raw.trim())?;
    if odds < Decimal::ONE {
        return Err(crate::CoreError::InvalidOdds(raw.to_string()));
    }
    Ok(odds)
}

/// Implied probability of decimal odds (`1 / odds`). Zero for non-positive odds.
pub fn implied_probability(odds: Decimal) -> Decimal {
    if odds <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    Decimal::ONE / odds
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_odds_for_side() {
        let mut quote = OddsQuote::empty(MatchId::new(1), Utc::now());
        assert!(quote.is_empty());

        quote.set_by_label("Home", dec!(1.85));
        quote.set_by_label("Draw", dec!(3.40));
        quote.set_by_label("Away", dec!(4.20));
        quote.set_by_label("Over 2.5", dec!(1.70));

        assert!(!quote.is_empty());
        assert_eq!(quote.odds_for(TeamSide::Home), Some(dec!(1.85)));
        assert_eq!(quote.odds_for(TeamSide::Away), Some(dec!(4.20)));
        assert_eq!(quote.draw_odds, Some(dec!(3.40)));
    }

    #[test]
    fn test_parse_decimal_odds() {
        assert_eq!(parse_decimal_odds("2.75").unwrap(), dec!(2.75));
        assert_eq!(parse_decimal_odds(" 1.01 ").unwrap(), dec!(1.01));
        assert!(matches!(
            parse_decimal_odds("0.5"),
            Err(crate::CoreError::InvalidOdds(_))
        ));
        assert!(matches!(
            parse_decimal_odds("evens"),
            Err(crate::CoreError::DecimalParse(_))
        ));
    }

    #[test]
    fn test_implied_probability() {
        assert_eq!(implied_probability(dec!(2)), dec!(0.5));
        assert_eq!(implied_probability(dec!(4)), dec!(0.25));
        assert_eq!(implied_probability(Decimal::ZERO), Decimal::ZERO);
        assert_eq!(implied_probability(dec!(-1)), Decimal::ZERO);
    }
}
