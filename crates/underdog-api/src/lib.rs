//! Rate-limited access to API-Football.
//!
//! - `RateLimiter`: sliding-window request budget shared by every call
//! - `FootballApi`: transport trait, with `HttpFootballApi` (reqwest) and
//!   `MockFootballApi` implementations
//! - `wire`: defensive parsing of the provider's JSON envelope

pub mod client;
pub mod error;
pub mod mock;
pub mod rate_limiter;
pub mod wire;

pub use client::{ApiConfig, BoxFuture, DynFootballApi, FootballApi, HttpFootballApi};
pub use error::{ApiError, ApiResult};
pub use mock::MockFootballApi;
pub use rate_limiter::RateLimiter;
