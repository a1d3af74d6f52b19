//! Serializable scheduling snapshots for host-side persistence.
//!
//! Hosts that want the last published state to survive a process restart
//! capture a snapshot after each publication and replay it at startup.
//! Guard lists and observers are construction-time wiring and are not
//! serialized.

mod error;

pub use error::SnapshotError;

use crate::core::{Item, ScheduleState};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Snapshot format version.
pub const SNAPSHOT_VERSION: u32 = 1;

/// A captured scheduling state plus the candidate list that produced it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Snapshot {
    /// Snapshot format version
    pub version: u32,

    /// Unique snapshot identifier
    pub id: String,

    /// When the snapshot was captured
    pub timestamp: DateTime<Utc>,

    /// The published per-surface state
    pub state: ScheduleState,

    /// The candidate list in effect when the state was published
    pub candidates: Vec<Item>,
}

impl Snapshot {
    /// Capture the current state and candidates with a fresh id.
    pub fn capture(state: &ScheduleState, candidates: &[Item]) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            state: state.clone(),
            candidates: candidates.to_vec(),
        }
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String, SnapshotError> {
        serde_json::to_string(self).map_err(|e| SnapshotError::SerializationFailed(e.to_string()))
    }

    /// Deserialize from JSON, validating the format version.
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        let snapshot: Self = serde_json::from_str(json)
            .map_err(|e| SnapshotError::DeserializationFailed(e.to_string()))?;
        snapshot.validate_version()
    }

    /// Serialize to a compact binary format.
    pub fn to_bytes(&self) -> Result<Vec<u8>, SnapshotError> {
        bincode::serialize(self).map_err(|e| SnapshotError::SerializationFailed(e.to_string()))
    }

    /// Deserialize from the binary format, validating the format version.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SnapshotError> {
        let snapshot: Self = bincode::deserialize(bytes)
            .map_err(|e| SnapshotError::DeserializationFailed(e.to_string()))?;
        snapshot.validate_version()
    }

    fn validate_version(self) -> Result<Self, SnapshotError> {
        if self.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion {
                found: self.version,
                supported: SNAPSHOT_VERSION,
            });
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Condition, Item, OptionPolicy, Payload, StateBuilder};

    fn sample_state() -> (ScheduleState, Vec<Item>) {
        let option = OptionPolicy::new("home", "standard");
        let payload = Payload::with_id("promo", 5, Condition::always()).option(option.clone());
        let item = Item::new(payload, option);

        let mut builder = StateBuilder::new();
        builder.set_active("home", item.clone());
        (builder.freeze(), vec![item])
    }

    #[test]
    fn capture_stamps_version_and_id() {
        let (state, candidates) = sample_state();
        let snapshot = Snapshot::capture(&state, &candidates);

        assert_eq!(snapshot.version, SNAPSHOT_VERSION);
        assert!(!snapshot.id.is_empty());
        assert_eq!(snapshot.state, state);
    }

    #[test]
    fn json_round_trip() {
        let (state, candidates) = sample_state();
        let snapshot = Snapshot::capture(&state, &candidates);

        let json = snapshot.to_json().unwrap();
        let restored = Snapshot::from_json(&json).unwrap();

        assert_eq!(restored.id, snapshot.id);
        assert_eq!(restored.state, snapshot.state);
        assert_eq!(restored.candidates, snapshot.candidates);
    }

    #[test]
    fn binary_round_trip() {
        let (state, candidates) = sample_state();
        let snapshot = Snapshot::capture(&state, &candidates);

        let bytes = snapshot.to_bytes().unwrap();
        let restored = Snapshot::from_bytes(&bytes).unwrap();

        assert_eq!(restored.state, snapshot.state);
    }

    #[test]
    fn unsupported_version_is_rejected() {
        let (state, candidates) = sample_state();
        let mut snapshot = Snapshot::capture(&state, &candidates);
        snapshot.version = SNAPSHOT_VERSION + 1;

        let json = snapshot.to_json().unwrap();
        let result = Snapshot::from_json(&json);

        assert!(matches!(
            result,
            Err(SnapshotError::UnsupportedVersion { .. })
        ));
    }

    #[test]
    fn garbage_bytes_fail_deserialization() {
        let result = Snapshot::from_bytes(&[0xde, 0xad, 0xbe, 0xef]);
        assert!(matches!(
            result,
            Err(SnapshotError::DeserializationFailed(_))
        ));
    }
}
