//! Simulated trading ledger.
//!
//! Holds the paper balance and open positions, sizes orders from signal
//! strength and accepts or rejects BUY signals. No real orders are sent.

pub mod config;
pub mod error;
pub mod ledger;
pub mod position;

pub use config::LedgerConfig;
pub use error::{LedgerError, LedgerResult};
pub use ledger::Ledger;
pub use position::{OrderResult, Outcome, Position, PositionStatus, RejectReason};
