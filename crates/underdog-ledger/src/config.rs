//! Ledger configuration.

use crate::error::{LedgerError, LedgerResult};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Bankroll and sizing limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Starting paper balance.
    #[serde(default = "default_initial_balance")]
    pub initial_balance: Decimal,
    /// Per-trade cap.
    #[serde(default = "default_max_position_size")]
    pub max_position_size: Decimal,
    /// Largest fraction of the current balance one trade may use.
    #[serde(default = "default_max_balance_fraction")]
    pub max_balance_fraction: Decimal,
}

fn default_initial_balance() -> Decimal {
    Decimal::from(10000)
}

fn default_max_position_size() -> Decimal {
    Decimal::from(100)
}

fn default_max_balance_fraction() -> Decimal {
    Decimal::new(2, 2) // 0.02
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            initial_balance: default_initial_balance(),
            max_position_size: default_max_position_size(),
            max_balance_fraction: default_max_balance_fraction(),
        }
    }
}

impl LedgerConfig {
    pub fn new(initial_balance: Decimal, max_position_size: Decimal) -> Self {
        Self {
            initial_balance,
            max_position_size,
            ..Default::default()
        }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> LedgerResult<()> {
        if self.initial_balance <= Decimal::ZERO {
            return Err(LedgerError::ConfigError(format!(
                "initial_balance ({}) must be positive",
                self.initial_balance
            )));
        }

        if self.max_position_size <= Decimal::ZERO {
            return Err(LedgerError::ConfigError(format!(
                "max_position_size ({}) must be positive",
                self.max_position_size
            )));
        }

        if self.max_balance_fraction <= Decimal::ZERO || self.max_balance_fraction > Decimal::ONE {
            return Err(LedgerError::ConfigError(format!(
                "max_balance_fraction ({}) must be in (0, 1]",
                self.max_balance_fraction
            )));
        }

        Ok(())
    }
}
