//! Frequency-cap guard: impression caps, cooldowns, and dismissals.

use crate::core::{Clock, Context, Item, StateBuilder, SystemClock};
use crate::guards::{apply_survivors, Guard, GuardError};
use crate::storage::{History, Storage};
use chrono::Duration;
use std::sync::Arc;

/// Drops held items whose persisted counters rule them out: dismissed items,
/// items at or over their impression cap, and items still inside their
/// cooldown window since last shown. Items marked `always_on_if_eligible`
/// are exempt. Removal backfills the surface like the ineligibility guard.
pub struct FrequencyCapGuard {
    clock: Arc<dyn Clock>,
}

impl FrequencyCapGuard {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    fn admissible(&self, storage: &dyn Storage, item: &Item) -> Result<bool, GuardError> {
        if item.option.always_on_if_eligible {
            return Ok(true);
        }
        let identity = item.identity();
        if storage.dismissed(&identity)? {
            return Ok(false);
        }
        if let Some(cap) = item.option.max_impressions {
            if storage.impression_count(&identity)? >= cap {
                return Ok(false);
            }
        }
        if let Some(minutes) = item.option.cooldown_minutes {
            if let Some(last_shown) = storage.last_shown_at(&identity)? {
                // A window too large to represent never elapses.
                let until = Duration::try_minutes(minutes)
                    .and_then(|cooldown| last_shown.checked_add_signed(cooldown));
                match until {
                    Some(until) if self.clock.now() >= until => {}
                    _ => return Ok(false),
                }
            }
        }
        Ok(true)
    }
}

impl Default for FrequencyCapGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl Guard for FrequencyCapGuard {
    fn name(&self) -> &'static str {
        "frequency-cap"
    }

    fn call(
        &self,
        storage: &dyn Storage,
        _history: &dyn History,
        mut state: StateBuilder,
        _candidates: &[Item],
        _context: &mut Context,
    ) -> Result<StateBuilder, GuardError> {
        for surface in state.surfaces() {
            let Some(slot) = state.slot(&surface).cloned() else {
                continue;
            };

            let mut active = None;
            if let Some(held) = slot.active {
                if self.admissible(storage, &held)? {
                    active = Some(held);
                }
            }

            let mut queue = Vec::with_capacity(slot.queue.len());
            for held in slot.queue {
                if self.admissible(storage, &held)? {
                    queue.push(held);
                }
            }

            apply_survivors(&mut state, &surface, active, queue);
        }

        Ok(state)
    }
}
