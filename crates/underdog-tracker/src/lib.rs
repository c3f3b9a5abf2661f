//! Live match tracking.
//!
//! Turns successive live fixture snapshots into discrete goal events, each
//! emitted exactly once.

pub mod error;
pub mod state;
pub mod tracker;

pub use error::{TrackerError, TrackerResult};
pub use state::{MatchStateStore, TrackedMatch};
pub use tracker::MatchTracker;
