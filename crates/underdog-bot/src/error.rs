//! Application error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("API error: {0}")]
    Api(#[from] underdog_api::ApiError),

    #[error("Tracker error: {0}")]
    Tracker(#[from] underdog_tracker::TrackerError),

    #[error("Signal error: {0}")]
    Signal(#[from] underdog_signal::SignalError),

    #[error("Ledger error: {0}")]
    Ledger(#[from] underdog_ledger::LedgerError),

    #[error("Telemetry error: {0}")]
    Telemetry(#[from] underdog_telemetry::TelemetryError),
}

pub type AppResult<T> = Result<T, AppError>;
