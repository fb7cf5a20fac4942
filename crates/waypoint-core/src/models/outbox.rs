//! Outbox model
//!
//! The outbox is the durable queue of locally-applied mutations awaiting
//! remote confirmation. Items are drained in enqueue order.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::note::{NoteDraft, NoteId};
use crate::models::trip::{TripDraft, TripId, TripPatch};

/// A pending remote-side effect of a mutation already applied locally
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboxItem {
    /// Queue entry identifier (not the entity's id)
    pub id: String,
    /// The queued operation with its typed payload
    pub op: OutboxOp,
    /// When the mutation was enqueued
    pub queued_at: DateTime<Utc>,
    /// Transient-failure count; the item stays queued until it succeeds
    /// or the remote confirms it is already applied
    pub retries: u32,
}

impl OutboxItem {
    /// Enqueue-time constructor
    #[must_use]
    pub fn new(op: OutboxOp) -> Self {
        Self {
            id: Uuid::now_v7().to_string(),
            op,
            queued_at: Utc::now(),
            retries: 0,
        }
    }
}

/// A queued mutation, keyed by (entity, operation) with a concretely
/// typed payload per arm so the drain's dispatch is exhaustive
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum OutboxOp {
    /// Trip created offline under a temporary id
    TripCreate {
        /// The optimistic id to swap for the server's
        temp_id: TripId,
        /// The original creation input
        draft: TripDraft,
    },
    /// Trip updated offline
    TripUpdate {
        /// Target trip
        id: TripId,
        /// The partial update as entered
        patch: TripPatch,
    },
    /// Trip deleted offline (or queued as a safety net)
    TripDelete {
        /// Target trip
        id: TripId,
    },
    /// Note created offline under a temporary id
    NoteCreate {
        /// The optimistic id to swap for the server's
        temp_id: NoteId,
        /// The original creation input
        draft: NoteDraft,
    },
    /// Note deleted offline
    NoteDelete {
        /// Target note
        id: NoteId,
    },
}

impl OutboxOp {
    /// Short human-readable label used in logs and CLI listings
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::TripCreate { .. } => "trip/create",
            Self::TripUpdate { .. } => "trip/update",
            Self::TripDelete { .. } => "trip/delete",
            Self::NoteCreate { .. } => "note/create",
            Self::NoteDelete { .. } => "note/delete",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_starts_without_retries() {
        let item = OutboxItem::new(OutboxOp::TripDelete { id: TripId::new() });
        assert_eq!(item.retries, 0);
        assert_eq!(item.op.label(), "trip/delete");
    }

    #[test]
    fn test_op_round_trips_through_json() {
        let op = OutboxOp::NoteDelete { id: NoteId::new() };
        let json = serde_json::to_string(&op).unwrap();
        assert!(json.contains("note_delete"));
        let back: OutboxOp = serde_json::from_str(&json).unwrap();
        assert_eq!(op, back);
    }
}
