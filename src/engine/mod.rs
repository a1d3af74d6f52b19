//! The scheduling engine and its run environment.
//!
//! The engine is the imperative shell around the pure guard pipeline: it
//! serializes runs, coalesces mid-run triggers, freezes and diffs the
//! result, and publishes to observers only on change. Each run is one
//! `stillwater` effect executed against a [`SchedulingEnv`].

mod env;
mod error;
mod machine;

pub use env::{SchedulingEnv, StandardEnv};
pub use error::EngineError;
pub use machine::{Engine, EngineStatus, RunOutcome};
