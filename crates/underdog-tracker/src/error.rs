//! Tracker error types.

use thiserror::Error;
use underdog_api::ApiError;

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("API error: {0}")]
    Api(#[from] ApiError),
}

pub type TrackerResult<T> = Result<T, TrackerError>;
