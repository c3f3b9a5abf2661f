//! API error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Malformed payload: {0}")]
    Malformed(String),
}

impl ApiError {
    /// Metrics label for the failure.
    pub fn outcome(&self) -> &'static str {
        match self {
            Self::HttpClient(_) => "http_error",
            Self::Status { .. } => "http_status",
            Self::Provider(_) => "provider_error",
            Self::Malformed(_) => "malformed",
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
