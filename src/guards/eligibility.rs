//! Eligibility-filtered scheduling guard, the no-queue variant.

use crate::core::{Context, Item, StateBuilder};
use crate::eligibility::EligibilityResolver;
use crate::guards::{Guard, GuardError};
use crate::storage::{History, Storage};
use std::sync::Arc;

/// Filters candidates through the resolver and sets every eligible one
/// active on its surface, with no queueing. Candidates are visited in list
/// order, so with several eligible candidates on one surface the last wins;
/// hosts that need ordering compose [`crate::guards::SchedulingGuard`]
/// instead.
pub struct EligibilitySchedulingGuard {
    resolver: Arc<EligibilityResolver>,
}

impl EligibilitySchedulingGuard {
    pub fn new(resolver: Arc<EligibilityResolver>) -> Self {
        Self { resolver }
    }
}

impl Guard for EligibilitySchedulingGuard {
    fn name(&self) -> &'static str {
        "eligibility-scheduling"
    }

    fn call(
        &self,
        _storage: &dyn Storage,
        _history: &dyn History,
        mut state: StateBuilder,
        candidates: &[Item],
        context: &mut Context,
    ) -> Result<StateBuilder, GuardError> {
        for candidate in candidates {
            if self.resolver.is_eligible(candidate, context)? {
                state.set_active(candidate.surface(), candidate.clone());
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

    fn candidate(id: &str, surface: &str, condition: Condition) -> Item {
        let option = OptionPolicy::new(surface, "standard");
        let payload = Payload::with_id(id, 0, condition).option(option.clone());
        Item::new(payload, option)
    }

    fn run(candidates: &[Item], context: &mut Context) -> crate::core::ScheduleState {
        let storage = MemoryStorage::new();
        let history = MemoryHistory::new();
        let guard = EligibilitySchedulingGuard::new(Arc::new(EligibilityResolver::new()));
        guard
            .call(&storage, &history, StateBuilder::new(), candidates, context)
            .unwrap()
            .freeze()
    }

    #[test]
    fn only_eligible_candidates_land() {
        let state = run(
            &[
                candidate("a", "home", Condition::never()),
                candidate("b", "settings", Condition::always()),
            ],
            &mut Context::new(),
        );

        assert!(state.active("home").is_none());
        assert_eq!(state.active("settings").map(|i| i.id()), Some("b"));
        assert!(state.queue("settings").is_empty());
    }

    #[test]
    fn later_eligible_candidate_wins_the_surface() {
        let state = run(
            &[
                candidate("first", "home", Condition::always()),
                candidate("second", "home", Condition::always()),
            ],
            &mut Context::new(),
        );

        assert_eq!(state.active("home").map(|i| i.id()), Some("second"));
    }

    #[test]
    fn context_facts_gate_candidates() {
        let mut context = Context::new();
        context.insert("plan", "pro");

        let state = run(
            &[candidate(
                "a",
                "home",
                Condition::membership("plan", ["pro"]),
            )],
            &mut context,
        );

        assert_eq!(state.active("home").map(|i| i.id()), Some("a"));
    }
}
