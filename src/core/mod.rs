//! Pure data model for surface content scheduling.
//!
//! This module contains the condition tree, the run-scoped fact context,
//! payloads/items, per-surface scheduling state with its builder, and the
//! diff helpers. Everything here is pure data and pure functions; evaluation
//! and effects live in the sibling modules.

mod clock;
mod condition;
mod context;
pub mod diff;
mod item;
mod state;

pub use clock::{Clock, FixedClock, SystemClock};
pub use condition::{Comparator, Condition};
pub use context::{Context, FactValue};
pub use diff::{ContentComparator, FieldComparator};
pub use item::{Item, ItemIdentity, OptionPolicy, Payload};
pub use state::{ScheduleState, Slot, StateBuilder};
