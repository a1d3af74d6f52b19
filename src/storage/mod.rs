//! Collaborator interfaces: persisted per-item counters and the show/dismiss
//! history log.
//!
//! Both are external to the scheduling core; guards only read counters and
//! history during a run. Writes to counters happen when the host actually
//! shows or dismisses content, outside the pipeline. In-memory
//! implementations ship for tests and demos.

mod memory;

pub use memory::{MemoryHistory, MemoryStorage};

use crate::core::ItemIdentity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Collaborator failure surfaced to the guard that consumed it.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Persisted per-item counters, keyed by item identity.
pub trait Storage: Send + Sync {
    fn impression_count(&self, identity: &ItemIdentity) -> Result<u32, StorageError>;

    fn set_impression_count(
        &self,
        identity: &ItemIdentity,
        count: u32,
    ) -> Result<(), StorageError>;

    fn last_shown_at(
        &self,
        identity: &ItemIdentity,
    ) -> Result<Option<DateTime<Utc>>, StorageError>;

    fn set_last_shown_at(
        &self,
        identity: &ItemIdentity,
        at: DateTime<Utc>,
    ) -> Result<(), StorageError>;

    fn dismissed(&self, identity: &ItemIdentity) -> Result<bool, StorageError>;

    fn set_dismissed(&self, identity: &ItemIdentity, dismissed: bool) -> Result<(), StorageError>;

    /// Forget every counter for the identity.
    fn clear_item(&self, identity: &ItemIdentity) -> Result<(), StorageError>;
}

/// What happened to an item, as recorded by the host.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum HistoryEvent {
    Shown,
    Dismissed,
    Expired,
    SystemDismissed,
}

/// One append-only history record.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub identity: ItemIdentity,
    pub event: HistoryEvent,
    pub timestamp: DateTime<Utc>,
}

/// Ordered, read-only access to past show/dismiss/expire events.
///
/// Entries are appended outside this core when content is actually shown or
/// dismissed; guards only read.
pub trait History: Send + Sync {
    /// All entries in append order.
    fn entries(&self) -> Result<Vec<HistoryEntry>, StorageError>;
}
