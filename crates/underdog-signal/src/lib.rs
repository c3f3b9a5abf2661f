//! Underdog signal evaluation.
//!
//! Looks up Match Winner odds for the scoring side of a goal (through a
//! one-hour cache) and turns a goal by the underdog into a BUY signal.

pub mod cache;
pub mod config;
pub mod engine;
pub mod error;

pub use cache::{Clock, OddsCache};
pub use config::SignalConfig;
pub use engine::{UnderdogSignalEngine, UnderdogVerdict};
pub use error::{SignalError, SignalResult};
