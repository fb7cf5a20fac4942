//! Durable key-value persistence
//!
//! Two logical namespaces share one store: the entity snapshot
//! ([`SNAPSHOT_KEY`]) and the outbox queue ([`OUTBOX_KEY`]). Payloads are
//! JSON; every instant round-trips through RFC 3339 text with no
//! precision loss because all date fields are typed `DateTime<Utc>`.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::{Note, Trip};

/// Storage key for the persisted entity snapshot
pub const SNAPSHOT_KEY: &str = "snapshot";

/// Storage key for the persisted outbox queue
pub const OUTBOX_KEY: &str = "outbox";

/// Contract for durable byte storage keyed by string
///
/// Implementations back both the entity snapshot and the outbox. A load
/// returning `Ok(None)` means the key was never written (first launch).
#[async_trait]
pub trait DurableStore: Send + Sync {
    /// Read the bytes stored under `key`, if any
    async fn load(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Write `bytes` under `key`, replacing any previous value
    async fn save(&self, key: &str, bytes: Vec<u8>) -> Result<()>;

    /// Delete the value stored under `key`; absent keys are not an error
    async fn remove(&self, key: &str) -> Result<()>;
}

/// The persisted entity snapshot: all trips and notes as of the last write
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// All locally known trips
    pub trips: Vec<Trip>,
    /// All locally known notes
    pub notes: Vec<Note>,
}

/// Encode a persisted payload as JSON bytes
pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(value)?)
}

/// Decode a persisted payload, surfacing failures as storage corruption
///
/// Corruption is a halting state consumed by the presentation layer to
/// offer a destructive reset; it is never auto-recovered.
pub fn decode<T: DeserializeOwned>(key: &str, bytes: &[u8]) -> Result<T> {
    serde_json::from_slice(bytes)
        .map_err(|error| Error::StorageCorruption(format!("{key}: {error}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NoteDraft, NoteId, TripDraft, TripId};
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn sample_snapshot() -> Snapshot {
        let trip = Trip::from_draft(
            TripId::new(),
            TripDraft {
                title: "Tokyo Adventure".to_string(),
                description: None,
                start_date: Utc.with_ymd_and_hms(2024, 3, 15, 0, 0, 0).unwrap(),
                end_date: Utc.with_ymd_and_hms(2024, 3, 22, 0, 0, 0).unwrap(),
                cover_image: None,
            },
        );
        let note = Note::from_draft(
            NoteId::new(),
            NoteDraft {
                trip_id: trip.id.clone(),
                content: "Visited Sensoji Temple".to_string(),
            },
        );
        Snapshot {
            trips: vec![trip],
            notes: vec![note],
        }
    }

    #[test]
    fn test_snapshot_round_trip_preserves_instants() {
        let snapshot = sample_snapshot();
        let bytes = encode(&snapshot).unwrap();
        let back: Snapshot = decode(SNAPSHOT_KEY, &bytes).unwrap();

        assert_eq!(back, snapshot);
        // Exact instant equality, not merely second precision
        assert_eq!(back.trips[0].created_at, snapshot.trips[0].created_at);
        assert_eq!(back.notes[0].updated_at, snapshot.notes[0].updated_at);
    }

    #[test]
    fn test_dates_encode_as_iso8601_text() {
        let snapshot = sample_snapshot();
        let json = String::from_utf8(encode(&snapshot).unwrap()).unwrap();
        assert!(json.contains("2024-03-15T00:00:00Z"));
    }

    #[test]
    fn test_decode_failure_is_storage_corruption() {
        let result = decode::<Snapshot>(SNAPSHOT_KEY, b"{not json");
        assert!(matches!(result, Err(Error::StorageCorruption(_))));
    }
}
