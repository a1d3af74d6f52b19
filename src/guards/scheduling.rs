//! Priority scheduling guard.

use crate::core::{Context, Item, StateBuilder};
use crate::guards::{Guard, GuardError};
use crate::storage::{History, Storage};
use std::collections::BTreeMap;

/// Groups candidates by surface, sorts by priority descending then stage
/// ascending (staged items before unstaged), sets the top item active and the
/// remainder as the queue.
///
/// Surfaces with no candidate this run keep whatever the builder already
/// holds; pruning stale surfaces is the sync guard's job.
#[derive(Clone, Copy, Debug, Default)]
pub struct SchedulingGuard;

impl SchedulingGuard {
    pub fn new() -> Self {
        Self
    }
}

// Staged items sort before unstaged, then by stage ordinal.
fn stage_rank(item: &Item) -> (bool, u32) {
    match item.option.stage {
        Some(stage) => (false, stage),
        None => (true, 0),
    }
}

impl Guard for SchedulingGuard {
    fn name(&self) -> &'static str {
        "scheduling"
    }

    fn call(
        &self,
        _storage: &dyn Storage,
        _history: &dyn History,
        mut state: StateBuilder,
        candidates: &[Item],
        _context: &mut Context,
    ) -> Result<StateBuilder, GuardError> {
        let mut by_surface: BTreeMap<&str, Vec<&Item>> = BTreeMap::new();
        for candidate in candidates {
            by_surface
                .entry(candidate.surface())
                .or_default()
                .push(candidate);
        }

        for (surface, mut items) in by_surface {
            items.sort_by(|a, b| {
                b.priority()
                    .cmp(&a.priority())
                    .then_with(|| stage_rank(a).cmp(&stage_rank(b)))
            });
            let mut ordered = items.into_iter().cloned();
            if let Some(top) = ordered.next() {
                state.set_active(surface, top);
                state.set_queue(surface, ordered.collect());
            }
        }

        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Condition, OptionPolicy, Payload};
    use crate::storage::{MemoryHistory, MemoryStorage};

    fn candidate(id: &str, surface: &str, priority: i32, stage: Option<u32>) -> Item {
        let mut option = OptionPolicy::new(surface, "standard");
        option.stage = stage;
        let payload = Payload::with_id(id, priority, Condition::always()).option(option.clone());
        Item::new(payload, option)
    }

    fn run(candidates: &[Item]) -> crate::core::ScheduleState {
        let storage = MemoryStorage::new();
        let history = MemoryHistory::new();
        let mut context = Context::new();
        SchedulingGuard::new()
            .call(&storage, &history, StateBuilder::new(), candidates, &mut context)
            .unwrap()
            .freeze()
    }

    #[test]
    fn highest_priority_wins_the_slot() {
        let state = run(&[
            candidate("a", "home", 1, None),
            candidate("b", "home", 5, None),
        ]);

        assert_eq!(state.active("home").map(|i| i.id()), Some("b"));
        let queued: Vec<&str> = state.queue("home").iter().map(|i| i.id()).collect();
        assert_eq!(queued, vec!["a"]);
    }

    #[test]
    fn staged_items_sort_before_unstaged_at_equal_priority() {
        let state = run(&[
            candidate("unstaged", "home", 3, None),
            candidate("step2", "home", 3, Some(2)),
            candidate("step1", "home", 3, Some(1)),
        ]);

        assert_eq!(state.active("home").map(|i| i.id()), Some("step1"));
        let queued: Vec<&str> = state.queue("home").iter().map(|i| i.id()).collect();
        assert_eq!(queued, vec!["step2", "unstaged"]);
    }

    #[test]
    fn surfaces_schedule_independently() {
        let state = run(&[
            candidate("a", "home", 1, None),
            candidate("b", "settings", 9, None),
        ]);

        assert_eq!(state.active("home").map(|i| i.id()), Some("a"));
        assert_eq!(state.active("settings").map(|i| i.id()), Some("b"));
    }

    #[test]
    fn untouched_surfaces_are_preserved() {
        let storage = MemoryStorage::new();
        let history = MemoryHistory::new();
        let mut context = Context::new();

        let mut previous = StateBuilder::new();
        previous.set_active("settings", candidate("old", "settings", 1, None));

        let state = SchedulingGuard::new()
            .call(
                &storage,
                &history,
                previous,
                &[candidate("a", "home", 1, None)],
                &mut context,
            )
            .unwrap()
            .freeze();

        assert_eq!(state.active("settings").map(|i| i.id()), Some("old"));
        assert_eq!(state.active("home").map(|i| i.id()), Some("a"));
    }
}
