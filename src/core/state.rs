//! Per-surface scheduling state: the immutable published snapshot and the
//! transient builder a pipeline run mutates.

use crate::core::item::Item;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One surface's assignment: the item currently shown plus the queue behind it.
///
/// Invariant: an item id appears at most once across active + queue.
#[derive(Clone, PartialEq, Debug, Default, Serialize, Deserialize)]
pub struct Slot {
    pub active: Option<Item>,
    pub queue: Vec<Item>,
}

impl Slot {
    pub fn is_empty(&self) -> bool {
        self.active.is_none() && self.queue.is_empty()
    }

    /// Active item first, then the queue in order.
    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.active.iter().chain(self.queue.iter())
    }
}

/// Immutable snapshot of every surface's slot, as published to observers.
///
/// Snapshots are only produced by [`StateBuilder::freeze`]; surfaces whose
/// slot emptied during a run do not appear.
///
/// # Example
///
/// ```rust
/// use billboard::core::{Condition, Item, OptionPolicy, Payload, StateBuilder};
///
/// let option = OptionPolicy::new("home_banner", "standard");
/// let payload = Payload::with_id("promo", 5, Condition::always()).option(option.clone());
/// let item = Item::new(payload, option);
///
/// let mut builder = StateBuilder::new();
/// builder.set_active("home_banner", item.clone());
/// let state = builder.freeze();
///
/// assert_eq!(state.active("home_banner").map(|i| i.id()), Some("promo"));
/// assert!(state.queue("home_banner").is_empty());
/// ```
#[derive(Clone, PartialEq, Debug, Default, Serialize, Deserialize)]
pub struct ScheduleState {
    slots: BTreeMap<String, Slot>,
}

impl ScheduleState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn slot(&self, surface: &str) -> Option<&Slot> {
        self.slots.get(surface)
    }

    pub fn active(&self, surface: &str) -> Option<&Item> {
        self.slots.get(surface).and_then(|slot| slot.active.as_ref())
    }

    pub fn queue(&self, surface: &str) -> &[Item] {
        self.slots
            .get(surface)
            .map(|slot| slot.queue.as_slice())
            .unwrap_or(&[])
    }

    /// Surfaces with a non-empty slot, in sorted order.
    pub fn surfaces(&self) -> impl Iterator<Item = &str> {
        self.slots.keys().map(String::as_str)
    }

    /// Every held item across all surfaces.
    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.slots.values().flat_map(Slot::items)
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// Mutable builder for the next snapshot, seeded from the previous one.
///
/// A builder is owned by exactly one guard at a time: the engine moves it
/// into the first guard, each guard moves it to the next, and the engine
/// freezes whatever comes out. `set_active`, `set_queue`, and `clear_surface`
/// are the only structural mutators, and each preserves the invariant that
/// an item id appears at most once per surface across active + queue.
#[derive(Debug, Default)]
pub struct StateBuilder {
    slots: BTreeMap<String, Slot>,
}

impl StateBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a builder with the previous snapshot's slots.
    pub fn from_state(state: &ScheduleState) -> Self {
        Self {
            slots: state.slots.clone(),
        }
    }

    /// Make `item` the surface's active item.
    ///
    /// Any queued item sharing the id is removed so the invariant holds.
    pub fn set_active(&mut self, surface: &str, item: Item) {
        let slot = self.slots.entry(surface.to_string()).or_default();
        slot.queue.retain(|queued| queued.id() != item.id());
        slot.active = Some(item);
    }

    /// Replace the surface's queue.
    ///
    /// Entries duplicating the active item's id or an earlier queue entry's
    /// id are dropped.
    pub fn set_queue(&mut self, surface: &str, items: Vec<Item>) {
        let slot = self.slots.entry(surface.to_string()).or_default();
        let active_id = slot.active.as_ref().map(|item| item.id().to_string());
        let mut seen: Vec<String> = Vec::new();
        slot.queue = items
            .into_iter()
            .filter(|item| {
                if active_id.as_deref() == Some(item.id()) || seen.iter().any(|id| id == item.id())
                {
                    return false;
                }
                seen.push(item.id().to_string());
                true
            })
            .collect();
    }

    /// Drop the surface's slot entirely.
    pub fn clear_surface(&mut self, surface: &str) {
        self.slots.remove(surface);
    }

    pub fn slot(&self, surface: &str) -> Option<&Slot> {
        self.slots.get(surface)
    }

    pub fn active(&self, surface: &str) -> Option<&Item> {
        self.slots.get(surface).and_then(|slot| slot.active.as_ref())
    }

    pub fn queue(&self, surface: &str) -> &[Item] {
        self.slots
            .get(surface)
            .map(|slot| slot.queue.as_slice())
            .unwrap_or(&[])
    }

    /// Owned list of current surface names, safe to iterate while mutating.
    pub fn surfaces(&self) -> Vec<String> {
        self.slots.keys().cloned().collect()
    }

    /// Produce the immutable snapshot, dropping surfaces that emptied.
    pub fn freeze(self) -> ScheduleState {
        let slots = self
            .slots
            .into_iter()
            .filter(|(_, slot)| !slot.is_empty())
            .collect();
        ScheduleState { slots }
    }
}
