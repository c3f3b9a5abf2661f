//! Ledger error types.

use thiserror::Error;
use underdog_core::MatchId;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Position not found for match {0}")]
    NotFound(MatchId),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

pub type LedgerResult<T> = Result<T, LedgerError>;
