//! Mutex-backed in-memory collaborators for tests and demos.

use crate::core::ItemIdentity;
use crate::storage::{History, HistoryEntry, Storage, StorageError};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Clone, Debug, Default)]
struct CounterRecord {
    impressions: u32,
    last_shown_at: Option<DateTime<Utc>>,
    dismissed: bool,
}

/// In-memory [`Storage`] implementation.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    records: Mutex<HashMap<ItemIdentity, CounterRecord>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn read<T>(
        &self,
        identity: &ItemIdentity,
        select: impl FnOnce(&CounterRecord) -> T,
    ) -> Result<T, StorageError>
    where
        T: Default,
    {
        let records = self.lock()?;
        Ok(records.get(identity).map(select).unwrap_or_default())
    }

    fn write(
        &self,
        identity: &ItemIdentity,
        update: impl FnOnce(&mut CounterRecord),
    ) -> Result<(), StorageError> {
        let mut records = self.lock()?;
        update(records.entry(identity.clone()).or_default());
        Ok(())
    }

    fn lock(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<ItemIdentity, CounterRecord>>, StorageError>
    {
        self.records
            .lock()
            .map_err(|_| StorageError::Backend("poisoned counter lock".to_string()))
    }
}

impl Storage for MemoryStorage {
    fn impression_count(&self, identity: &ItemIdentity) -> Result<u32, StorageError> {
        self.read(identity, |record| record.impressions)
    }

    fn set_impression_count(
        &self,
        identity: &ItemIdentity,
        count: u32,
    ) -> Result<(), StorageError> {
        self.write(identity, |record| record.impressions = count)
    }

    fn last_shown_at(
        &self,
        identity: &ItemIdentity,
    ) -> Result<Option<DateTime<Utc>>, StorageError> {
        self.read(identity, |record| record.last_shown_at)
    }

    fn set_last_shown_at(
        &self,
        identity: &ItemIdentity,
        at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        self.write(identity, |record| record.last_shown_at = Some(at))
    }

    fn dismissed(&self, identity: &ItemIdentity) -> Result<bool, StorageError> {
        self.read(identity, |record| record.dismissed)
    }

    fn set_dismissed(&self, identity: &ItemIdentity, dismissed: bool) -> Result<(), StorageError> {
        self.write(identity, |record| record.dismissed = dismissed)
    }

    fn clear_item(&self, identity: &ItemIdentity) -> Result<(), StorageError> {
        let mut records = self.lock()?;
        records.remove(identity);
        Ok(())
    }
}

/// In-memory [`History`] implementation with an `append` helper for hosts.
#[derive(Debug, Default)]
pub struct MemoryHistory {
    entries: Mutex<Vec<HistoryEntry>>,
}

impl MemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one event. Hosts call this when content is shown or dismissed.
    pub fn append(&self, entry: HistoryEntry) -> Result<(), StorageError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| StorageError::Backend("poisoned history lock".to_string()))?;
        entries.push(entry);
        Ok(())
    }
}

impl History for MemoryHistory {
    fn entries(&self) -> Result<Vec<HistoryEntry>, StorageError> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| StorageError::Backend("poisoned history lock".to_string()))?;
        Ok(entries.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::HistoryEvent;

    fn identity(id: &str) -> ItemIdentity {
        ItemIdentity {
            id: id.to_string(),
            surface: "home".to_string(),
            variant: "standard".to_string(),
        }
    }

    #[test]
    fn unknown_identity_reads_defaults() {
        let storage = MemoryStorage::new();
        let id = identity("promo");

        assert_eq!(storage.impression_count(&id).unwrap(), 0);
        assert_eq!(storage.last_shown_at(&id).unwrap(), None);
        assert!(!storage.dismissed(&id).unwrap());
    }

    #[test]
    fn counters_round_trip() {
        let storage = MemoryStorage::new();
        let id = identity("promo");
        let shown = Utc::now();

        storage.set_impression_count(&id, 3).unwrap();
        storage.set_last_shown_at(&id, shown).unwrap();
        storage.set_dismissed(&id, true).unwrap();

        assert_eq!(storage.impression_count(&id).unwrap(), 3);
        assert_eq!(storage.last_shown_at(&id).unwrap(), Some(shown));
        assert!(storage.dismissed(&id).unwrap());
    }

    #[test]
    fn clear_item_forgets_counters() {
        let storage = MemoryStorage::new();
        let id = identity("promo");

        storage.set_impression_count(&id, 3).unwrap();
        storage.clear_item(&id).unwrap();

        assert_eq!(storage.impression_count(&id).unwrap(), 0);
    }

    #[test]
    fn counters_are_keyed_by_full_identity() {
        let storage = MemoryStorage::new();
        let home = identity("promo");
        let mut settings = identity("promo");
        settings.surface = "settings".to_string();

        storage.set_impression_count(&home, 5).unwrap();
        assert_eq!(storage.impression_count(&settings).unwrap(), 0);
    }

    #[test]
    fn history_preserves_append_order() {
        let history = MemoryHistory::new();
        let first = HistoryEntry {
            identity: identity("a"),
            event: HistoryEvent::Shown,
            timestamp: Utc::now(),
        };
        let second = HistoryEntry {
            identity: identity("a"),
            event: HistoryEvent::Dismissed,
            timestamp: Utc::now(),
        };

        history.append(first.clone()).unwrap();
        history.append(second.clone()).unwrap();

        assert_eq!(history.entries().unwrap(), vec![first, second]);
    }
}
