//! Run environment: the collaborators a pipeline run reads from.

use crate::storage::{History, Storage};
use std::sync::Arc;

/// Environment handed to every run effect.
///
/// Effects resolve their environment at run time, so collaborators are
/// injected where the effect is executed rather than held by the engine.
pub trait SchedulingEnv: Clone + Send + Sync + 'static {
    fn storage(&self) -> &dyn Storage;
    fn history(&self) -> &dyn History;
}

/// The usual environment: shared handles to a storage and history
/// collaborator.
///
/// # Example
///
/// ```rust
/// use billboard::engine::{SchedulingEnv, StandardEnv};
/// use billboard::storage::{MemoryHistory, MemoryStorage};
/// use std::sync::Arc;
///
/// let env = StandardEnv::new(
///     Arc::new(MemoryStorage::new()),
///     Arc::new(MemoryHistory::new()),
/// );
/// assert!(env.history().entries().unwrap().is_empty());
/// ```
#[derive(Clone)]
pub struct StandardEnv {
    storage: Arc<dyn Storage>,
    history: Arc<dyn History>,
}

impl StandardEnv {
    pub fn new(storage: Arc<dyn Storage>, history: Arc<dyn History>) -> Self {
        Self { storage, history }
    }
}

impl SchedulingEnv for StandardEnv {
    fn storage(&self) -> &dyn Storage {
        self.storage.as_ref()
    }

    fn history(&self) -> &dyn History {
        self.history.as_ref()
    }
}
