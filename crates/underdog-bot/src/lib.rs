//! Underdog goal trading bot.
//!
//! Orchestrates the components on a timer:
//! - Live match polling and goal detection
//! - Underdog odds evaluation
//! - Paper execution against the ledger
//! - Periodic performance summaries

pub mod app;
pub mod config;
pub mod error;

pub use app::{Application, CycleReport};
pub use config::AppConfig;
pub use error::{AppError, AppResult};
