//! Ineligibility removal guard, the usual terminal stage.

use crate::core::{Context, Item, ItemIdentity, StateBuilder};
use crate::eligibility::EligibilityResolver;
use crate::guards::{apply_survivors, Guard, GuardError};
use crate::storage::{History, Storage};
use std::collections::HashMap;
use std::sync::Arc;

/// Evaluates eligibility of every held item per surface and removes the
/// ineligible ones. An ineligible active item is replaced by the first
/// eligible queued item (the queue shifting up), or the surface is cleared
/// when nothing eligible remains.
///
/// Each distinct identity is evaluated once per run; promotion trusts that
/// first verdict rather than re-evaluating after the shift, so a condition
/// flipping mid-run (a time boundary, say) takes effect on the next run.
pub struct IneligibilityRemovalGuard {
    resolver: Arc<EligibilityResolver>,
}

impl IneligibilityRemovalGuard {
    pub fn new(resolver: Arc<EligibilityResolver>) -> Self {
        Self { resolver }
    }

    fn verdict(
        &self,
        cache: &mut HashMap<ItemIdentity, bool>,
        item: &Item,
        context: &Context,
    ) -> Result<bool, GuardError> {
        let identity = item.identity();
        if let Some(verdict) = cache.get(&identity) {
            return Ok(*verdict);
        }
        let verdict = self.resolver.is_eligible(item, context)?;
        cache.insert(identity, verdict);
        Ok(verdict)
    }
}

impl Guard for IneligibilityRemovalGuard {
    fn name(&self) -> &'static str {
        "ineligibility-removal"
    }

    fn call(
        &self,
        _storage: &dyn Storage,
        _history: &dyn History,
        mut state: StateBuilder,
        _candidates: &[Item],
        context: &mut Context,
    ) -> Result<StateBuilder, GuardError> {
        let mut cache: HashMap<ItemIdentity, bool> = HashMap::new();

        for surface in state.surfaces() {
            let Some(slot) = state.slot(&surface).cloned() else {
                continue;
            };

            let mut active = None;
            if let Some(held) = slot.active {
                if self.verdict(&mut cache, &held, context)? {
                    active = Some(held);
                }
            }

            let mut queue = Vec::with_capacity(slot.queue.len());
            for held in slot.queue {
                if self.verdict(&mut cache, &held, context)? {
                    queue.push(held);
                }
            }

            apply_survivors(&mut state, &surface, active, queue);
        }

        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Condition, OptionPolicy, Payload};
    use crate::storage::{MemoryHistory, MemoryStorage};

    fn item(id: &str, condition: Condition) -> Item {
        let option = OptionPolicy::new("home", "standard");
        let payload = Payload::with_id(id, 0, condition).option(option.clone());
        Item::new(payload, option)
    }

    fn run(previous: StateBuilder, context: &mut Context) -> crate::core::ScheduleState {
        let storage = MemoryStorage::new();
        let history = MemoryHistory::new();
        let guard = IneligibilityRemovalGuard::new(Arc::new(EligibilityResolver::new()));
        guard
            .call(&storage, &history, previous, &[], context)
            .unwrap()
            .freeze()
    }

    #[test]
    fn ineligible_active_promotes_first_eligible_queued() {
        let mut previous = StateBuilder::new();
        previous.set_active("home", item("x", Condition::never()));
        previous.set_queue(
            "home",
            vec![
                item("y", Condition::always()),
                item("z", Condition::always()),
            ],
        );

        let state = run(previous, &mut Context::new());

        assert_eq!(state.active("home").map(|i| i.id()), Some("y"));
        let queued: Vec<&str> = state.queue("home").iter().map(|i| i.id()).collect();
        assert_eq!(queued, vec!["z"]);
    }

    #[test]
    fn ineligible_queued_items_are_dropped() {
        let mut previous = StateBuilder::new();
        previous.set_active("home", item("a", Condition::always()));
        previous.set_queue(
            "home",
            vec![
                item("b", Condition::never()),
                item("c", Condition::always()),
            ],
        );

        let state = run(previous, &mut Context::new());

        assert_eq!(state.active("home").map(|i| i.id()), Some("a"));
        let queued: Vec<&str> = state.queue("home").iter().map(|i| i.id()).collect();
        assert_eq!(queued, vec!["c"]);
    }

    #[test]
    fn surface_clears_when_nothing_eligible_remains() {
        let mut previous = StateBuilder::new();
        previous.set_active("home", item("x", Condition::never()));
        previous.set_queue("home", vec![item("y", Condition::never())]);

        let state = run(previous, &mut Context::new());

        assert!(state.slot("home").is_none());
    }

    #[test]
    fn eligible_slot_is_untouched() {
        let mut previous = StateBuilder::new();
        previous.set_active("home", item("a", Condition::always()));
        previous.set_queue("home", vec![item("b", Condition::always())]);
        let expected = StateBuilder::from_state(&previous.freeze());

        let state = run(expected, &mut Context::new());

        assert_eq!(state.active("home").map(|i| i.id()), Some("a"));
        assert_eq!(state.queue("home").len(), 1);
    }

    #[test]
    fn condition_errors_propagate_instead_of_removing() {
        use crate::core::SystemClock;

        // Empty registry: every evaluation is a wiring defect.
        let resolver =
            EligibilityResolver::with_rules(Vec::new(), Arc::new(SystemClock));
        let guard = IneligibilityRemovalGuard::new(Arc::new(resolver));

        let mut previous = StateBuilder::new();
        previous.set_active("home", item("a", Condition::always()));

        let storage = MemoryStorage::new();
        let history = MemoryHistory::new();
        let result = guard.call(&storage, &history, previous, &[], &mut Context::new());

        assert!(matches!(result, Err(GuardError::Eligibility(_))));
    }

    #[test]
    fn verdicts_respect_context_facts() {
        let mut previous = StateBuilder::new();
        previous.set_active("home", item("a", Condition::flag("beta", true)));

        let mut context = Context::new();
        context.insert("beta", true);
        let state = run(previous, &mut context);

        assert_eq!(state.active("home").map(|i| i.id()), Some("a"));
    }
}
