//! Engine error types.

use crate::guards::GuardError;
use thiserror::Error;

/// Errors surfaced on the engine's error channel.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A guard aborted the run; the previous snapshot is retained.
    #[error(transparent)]
    Guard(#[from] GuardError),

    /// `process` was called while a run was already in flight.
    #[error("a run is already in flight; trigger it again after apply")]
    RunInFlight,
}
