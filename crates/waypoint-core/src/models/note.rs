//! Note model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::trip::{TripId, TEMP_ID_PREFIX};

/// A unique identifier for a note
///
/// Same scheme as [`TripId`]: bare UUID v7 when server-issued,
/// `temp-note-` prefixed when synthesized offline.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(String);

impl NoteId {
    /// Create a new server-style note ID using UUID v7
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    /// Create a temporary id for a note created while offline
    #[must_use]
    pub fn new_temporary() -> Self {
        Self(format!("{TEMP_ID_PREFIX}note-{}", Uuid::now_v7()))
    }

    /// Whether this id was synthesized offline and awaits reconciliation
    #[must_use]
    pub fn is_temporary(&self) -> bool {
        self.0.starts_with(TEMP_ID_PREFIX)
    }

    /// Get the string representation of this ID
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for NoteId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for NoteId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(Error::InvalidInput("Note ID cannot be empty".into()));
        }
        Ok(Self(s.to_string()))
    }
}

/// A journal note attached to a trip
///
/// The `trip_id` reference is maintained by cascade deletion, not by a
/// constraint: deleting a trip removes every note carrying its id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Unique identifier
    pub id: NoteId,
    /// Owning trip
    pub trip_id: TripId,
    /// Plain text content
    pub content: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Note {
    /// Build a note from a draft with the given id and current timestamps
    #[must_use]
    pub fn from_draft(id: NoteId, draft: NoteDraft) -> Self {
        let now = Utc::now();
        Self {
            id,
            trip_id: draft.trip_id,
            content: draft.content,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Creation payload for a note
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteDraft {
    /// Owning trip
    pub trip_id: TripId,
    /// Plain text content
    pub content: String,
}

impl NoteDraft {
    /// Validate input before it reaches the engine
    pub fn validate(&self) -> Result<()> {
        if self.content.trim().is_empty() {
            return Err(Error::InvalidInput("Note content cannot be empty".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_id_temporary_prefix() {
        let id = NoteId::new_temporary();
        assert!(id.is_temporary());
        assert!(id.as_str().starts_with("temp-note-"));
        assert!(!NoteId::new().is_temporary());
    }

    #[test]
    fn test_note_id_parse() {
        let id = NoteId::new();
        let parsed: NoteId = id.as_str().parse().unwrap();
        assert_eq!(id, parsed);
        assert!("".parse::<NoteId>().is_err());
    }

    #[test]
    fn test_note_from_draft() {
        let trip_id = TripId::new();
        let note = Note::from_draft(
            NoteId::new(),
            NoteDraft {
                trip_id: trip_id.clone(),
                content: "Visited Sensoji Temple".to_string(),
            },
        );
        assert_eq!(note.trip_id, trip_id);
        assert_eq!(note.created_at, note.updated_at);
    }

    #[test]
    fn test_draft_validation() {
        let draft = NoteDraft {
            trip_id: TripId::new(),
            content: "  ".to_string(),
        };
        assert!(draft.validate().is_err());
    }
}
