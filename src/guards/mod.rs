//! Guard pipeline stages.
//!
//! A guard is one stage of the ordered state-transition pipeline. Each call
//! takes the builder by value and returns it, so ownership is linear: exactly
//! one guard holds the builder at a time and hands it forward. Guards may
//! read candidates and history, mutate only the builder, and read or publish
//! context facts; composition order is declared by the engine's caller, never
//! inferred.

mod eligibility;
mod frequency;
mod removal;
mod scheduling;
mod sync;

pub use eligibility::EligibilitySchedulingGuard;
pub use frequency::FrequencyCapGuard;
pub use removal::IneligibilityRemovalGuard;
pub use scheduling::SchedulingGuard;
pub use sync::SyncGuard;

use crate::core::{Context, Item, StateBuilder};
use crate::eligibility::EligibilityError;
use crate::storage::{History, Storage, StorageError};
use thiserror::Error;

/// A guard failure aborts the remainder of the run; the engine retains the
/// previous snapshot and reports the error on its error channel.
#[derive(Debug, Error)]
pub enum GuardError {
    /// Guard-specific failure.
    #[error("guard '{guard}' failed: {message}")]
    Failed { guard: &'static str, message: String },

    /// A condition variant had no rule; a wiring defect, never "ineligible".
    #[error(transparent)]
    Eligibility(#[from] EligibilityError),

    /// A storage collaborator failed.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// One stage of the guard pipeline.
pub trait Guard: Send + Sync {
    /// Stable name used in logs and failure reports.
    fn name(&self) -> &'static str;

    /// Compute the next builder from the previous one, the fresh candidate
    /// list, and the run context.
    fn call(
        &self,
        storage: &dyn Storage,
        history: &dyn History,
        state: StateBuilder,
        candidates: &[Item],
        context: &mut Context,
    ) -> Result<StateBuilder, GuardError>;
}

/// Rewrite one surface from the items that survived a filtering pass.
///
/// If the previous active item survived it stays active; otherwise the first
/// surviving queued item is promoted and the queue shifts; an empty survivor
/// set clears the surface.
pub(crate) fn apply_survivors(
    state: &mut StateBuilder,
    surface: &str,
    active: Option<Item>,
    mut queue: Vec<Item>,
) {
    match active {
        Some(item) => {
            state.set_active(surface, item);
            state.set_queue(surface, queue);
        }
        None if !queue.is_empty() => {
            let promoted = queue.remove(0);
            state.set_active(surface, promoted);
            state.set_queue(surface, queue);
        }
        None => state.clear_surface(surface),
    }
}
