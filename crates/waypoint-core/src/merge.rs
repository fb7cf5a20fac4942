//! Last-write-wins conflict merging
//!
//! Used whenever local state is reconciled against a freshly fetched
//! remote snapshot. This is not a three-way merge: there is no common
//! ancestor, so a local edit with a stale `updated_at` is silently
//! overwritten by a newer remote edit, and vice versa.

use chrono::{DateTime, Utc};
use std::collections::HashMap;

use crate::models::{Note, Trip};

/// A record that participates in last-write-wins merging
pub trait LwwRecord {
    /// Identity key for deduplication
    fn record_id(&self) -> &str;
    /// Recency used to pick a winner
    fn updated_at(&self) -> DateTime<Utc>;
}

impl LwwRecord for Trip {
    fn record_id(&self) -> &str {
        self.id.as_str()
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

impl LwwRecord for Note {
    fn record_id(&self) -> &str {
        self.id.as_str()
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

/// Merge two collections of the same entity by identity and recency.
///
/// For each id present in either input the item with the greater
/// `updated_at` wins; on a tie the remote (later operand) value is kept.
/// First-seen order of ids is preserved, so local ordering survives a
/// merge unless the remote introduces new records (appended at the end).
#[must_use]
pub fn merge_last_write_wins<T: LwwRecord>(local: Vec<T>, remote: Vec<T>) -> Vec<T> {
    let mut merged: Vec<T> = Vec::with_capacity(local.len() + remote.len());
    let mut index_by_id: HashMap<String, usize> = HashMap::new();

    for item in local.into_iter().chain(remote) {
        match index_by_id.get(item.record_id()) {
            Some(&at) => {
                if item.updated_at() >= merged[at].updated_at() {
                    merged[at] = item;
                }
            }
            None => {
                index_by_id.insert(item.record_id().to_string(), merged.len());
                merged.push(item);
            }
        }
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NoteId, TripId};
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn note(id: &NoteId, trip_id: &TripId, content: &str, updated_at: DateTime<Utc>) -> Note {
        Note {
            id: id.clone(),
            trip_id: trip_id.clone(),
            content: content.to_string(),
            created_at: updated_at,
            updated_at,
        }
    }

    fn at(secs: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, secs).unwrap()
    }

    #[test]
    fn test_one_record_per_id() {
        let trip_id = TripId::new();
        let id_a = NoteId::new();
        let id_b = NoteId::new();

        let local = vec![
            note(&id_a, &trip_id, "local a", at(1)),
            note(&id_b, &trip_id, "local b", at(5)),
        ];
        let remote = vec![
            note(&id_a, &trip_id, "remote a", at(2)),
            note(&id_b, &trip_id, "remote b", at(3)),
        ];

        let merged = merge_last_write_wins(local, remote);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].content, "remote a");
        assert_eq!(merged[1].content, "local b");
    }

    #[test]
    fn test_tie_keeps_remote_value() {
        let trip_id = TripId::new();
        let id = NoteId::new();

        let local = vec![note(&id, &trip_id, "local", at(4))];
        let remote = vec![note(&id, &trip_id, "remote", at(4))];

        let merged = merge_last_write_wins(local, remote);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].content, "remote");
    }

    #[test]
    fn test_disjoint_ids_are_all_kept() {
        let trip_id = TripId::new();
        let local = vec![note(&NoteId::new(), &trip_id, "only local", at(1))];
        let remote = vec![note(&NoteId::new(), &trip_id, "only remote", at(2))];

        let merged = merge_last_write_wins(local, remote);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].content, "only local");
        assert_eq!(merged[1].content, "only remote");
    }

    #[test]
    fn test_newer_remote_beats_newer_of_two_local_versions() {
        // t1 < t2 locally, remote carries t3 > t2 for the t1 note
        let trip_id = TripId::new();
        let id_old = NoteId::new();
        let id_new = NoteId::new();

        let local = vec![
            note(&id_old, &trip_id, "local t1", at(1)),
            note(&id_new, &trip_id, "local t2", at(2)),
        ];
        let remote = vec![note(&id_old, &trip_id, "remote t3", at(3))];

        let merged = merge_last_write_wins(local, remote);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].content, "remote t3");
        assert_eq!(merged[1].content, "local t2");
    }

    #[test]
    fn test_empty_inputs() {
        let merged: Vec<Note> = merge_last_write_wins(Vec::new(), Vec::new());
        assert!(merged.is_empty());

        let trip_id = TripId::new();
        let only = vec![note(&NoteId::new(), &trip_id, "solo", at(1))];
        let merged = merge_last_write_wins(only.clone(), Vec::new());
        assert_eq!(merged, only);
    }
}
