//! Signal configuration.

use crate::error::{SignalError, SignalResult};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Configuration for underdog detection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalConfig {
    /// Decimal odds at or above which a side counts as the underdog.
    #[serde(default = "default_underdog_threshold")]
    pub underdog_threshold: Decimal,
    /// Odds at which signal strength saturates at 1.0.
    #[serde(default = "default_full_strength_odds")]
    pub full_strength_odds: Decimal,
    /// How long fetched odds stay fresh.
    #[serde(default = "default_odds_ttl_secs")]
    pub odds_ttl_secs: u64,
}

fn default_underdog_threshold() -> Decimal {
    Decimal::new(25, 1) // 2.5
}

fn default_full_strength_odds() -> Decimal {
    Decimal::from(5)
}

fn default_odds_ttl_secs() -> u64 {
    3600
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            underdog_threshold: default_underdog_threshold(),
            full_strength_odds: default_full_strength_odds(),
            odds_ttl_secs: default_odds_ttl_secs(),
        }
    }
}

impl SignalConfig {
    /// Validate configuration values.
    pub fn validate(&self) -> SignalResult<()> {
        if self.underdog_threshold < Decimal::ONE {
            return Err(SignalError::ConfigError(format!(
                "underdog_threshold ({}) must be at least 1.0",
                self.underdog_threshold
            )));
        }

        if self.full_strength_odds <= Decimal::ZERO {
            return Err(SignalError::ConfigError(format!(
                "full_strength_odds ({}) must be positive",
                self.full_strength_odds
            )));
        }

        if self.odds_ttl_secs == 0 {
            return Err(SignalError::ConfigError(
                "odds_ttl_secs must be positive".to_string(),
            ));
        }

        Ok(())
    }
}
