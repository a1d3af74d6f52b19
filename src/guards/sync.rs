//! Candidate reconciliation guard.

use crate::core::{ContentComparator, Context, FieldComparator, Item, ItemIdentity, StateBuilder};
use crate::guards::{apply_survivors, Guard, GuardError};
use crate::storage::{History, Storage};
use std::collections::HashMap;
use std::sync::Arc;

/// Reconciles slot contents against the fresh candidate set, keyed by item
/// identity: items absent from candidates are dropped, items whose content
/// changed (per the comparator) are replaced with the candidate's version,
/// unchanged items are kept as-is. A surface whose item set empties is
/// cleared; a dropped active item is backfilled from the surviving queue.
pub struct SyncGuard {
    comparator: Arc<dyn ContentComparator>,
}

impl SyncGuard {
    /// Sync guard with the default field comparator.
    pub fn new() -> Self {
        Self::with_comparator(Arc::new(FieldComparator))
    }

    /// Sync guard with a host-supplied change check.
    pub fn with_comparator(comparator: Arc<dyn ContentComparator>) -> Self {
        Self { comparator }
    }

    fn refresh(&self, held: &Item, candidates: &HashMap<ItemIdentity, &Item>) -> Option<Item> {
        let candidate = candidates.get(&held.identity())?;
        if self.comparator.changed(held, candidate) {
            Some((*candidate).clone())
        } else {
            Some(held.clone())
        }
    }
}

impl Default for SyncGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl Guard for SyncGuard {
    fn name(&self) -> &'static str {
        "sync"
    }

    fn call(
        &self,
        _storage: &dyn Storage,
        _history: &dyn History,
        mut state: StateBuilder,
        candidates: &[Item],
        _context: &mut Context,
    ) -> Result<StateBuilder, GuardError> {
        let by_identity: HashMap<ItemIdentity, &Item> = candidates
            .iter()
            .map(|candidate| (candidate.identity(), candidate))
            .collect();

        for surface in state.surfaces() {
            let Some(slot) = state.slot(&surface).cloned() else {
                continue;
            };
            let active = slot
                .active
                .as_ref()
                .and_then(|held| self.refresh(held, &by_identity));
            let queue: Vec<Item> = slot
                .queue
                .iter()
                .filter_map(|held| self.refresh(held, &by_identity))
                .collect();
            apply_survivors(&mut state, &surface, active, queue);
        }

        Ok(state)
    }
}
