//! Structural equality helpers used for reconciliation and change detection.
//!
//! Item equivalence here deliberately ignores the condition tree: a condition
//! edit alone does not re-render content, it only changes future eligibility
//! verdicts. Identity fields, the bound option policy, priority, and metadata
//! are what the host renders from, so those are what the diff compares.

use crate::core::item::Item;
use crate::core::state::{ScheduleState, Slot};

/// Whether two items present the same content.
///
/// Compares identity fields (id, surface, variant), priority, every option
/// policy field, and metadata deep-equality (same key set, equal values).
///
/// # Example
///
/// ```rust
/// use billboard::core::{diff, Condition, Item, OptionPolicy, Payload};
///
/// let option = OptionPolicy::new("home", "standard");
/// let payload = Payload::with_id("promo", 5, Condition::always())
///     .option(option.clone())
///     .metadata("headline", "Hello");
/// let a = Item::new(payload.clone(), option.clone());
/// let b = Item::new(payload.clone(), option.clone());
/// assert!(diff::items_equivalent(&a, &b));
///
/// let changed = Item::new(payload.metadata("headline", "Goodbye"), option);
/// assert!(!diff::items_equivalent(&a, &changed));
/// ```
pub fn items_equivalent(a: &Item, b: &Item) -> bool {
    a.payload.id == b.payload.id
        && a.payload.priority == b.payload.priority
        && a.option == b.option
        && a.payload.metadata == b.payload.metadata
}

/// Slot equality composed from item equivalence.
pub fn slots_equal(a: &Slot, b: &Slot) -> bool {
    let actives_match = match (&a.active, &b.active) {
        (Some(x), Some(y)) => items_equivalent(x, y),
        (None, None) => true,
        _ => false,
    };
    actives_match
        && a.queue.len() == b.queue.len()
        && a.queue
            .iter()
            .zip(b.queue.iter())
            .all(|(x, y)| items_equivalent(x, y))
}

/// State equality composed from slot equality.
///
/// The engine uses this after every run to decide whether to publish.
pub fn states_equal(a: &ScheduleState, b: &ScheduleState) -> bool {
    let surfaces: Vec<&str> = a.surfaces().collect();
    let others: Vec<&str> = b.surfaces().collect();
    if surfaces != others {
        return false;
    }
    surfaces.into_iter().all(|surface| {
        match (a.slot(surface), b.slot(surface)) {
            (Some(x), Some(y)) => slots_equal(x, y),
            _ => false,
        }
    })
}

/// Pluggable change check used by the sync guard to decide whether a held
/// item must be replaced by its candidate version.
pub trait ContentComparator: Send + Sync {
    fn changed(&self, current: &Item, candidate: &Item) -> bool;
}

/// Default comparator: changed when not [`items_equivalent`].
#[derive(Clone, Copy, Debug, Default)]
pub struct FieldComparator;

impl ContentComparator for FieldComparator {
    fn changed(&self, current: &Item, candidate: &Item) -> bool {
        !items_equivalent(current, candidate)
    }
}
