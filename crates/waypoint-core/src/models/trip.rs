//! Trip model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::{Error, Result};

/// Prefix carried by identifiers synthesized for offline creation.
///
/// A temporary id stays on the entity until the outbox drain swaps in the
/// server-issued one.
pub const TEMP_ID_PREFIX: &str = "temp-";

/// A unique identifier for a trip
///
/// Server-issued ids are bare UUID v7 strings (time-sortable); offline
/// creation synthesizes a `temp-` prefixed id until reconciled.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TripId(String);

impl TripId {
    /// Create a new server-style trip ID using UUID v7
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    /// Create a temporary id for a trip created while offline
    #[must_use]
    pub fn new_temporary() -> Self {
        Self(format!("{TEMP_ID_PREFIX}{}", Uuid::now_v7()))
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

impl Default for TripId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TripId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TripId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(Error::InvalidInput("Trip ID cannot be empty".into()));
        }
        Ok(Self(s.to_string()))
    }
}

/// A journaled trip
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trip {
    /// Unique identifier
    pub id: TripId,
    /// Trip title
    pub title: String,
    /// Optional free-form description
    pub description: Option<String>,
    /// First day of the trip
    pub start_date: DateTime<Utc>,
    /// Last day of the trip
    pub end_date: DateTime<Utc>,
    /// Optional cover image reference
    pub cover_image: Option<String>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Trip {
    /// Build a trip from a draft with the given id and current timestamps
    #[must_use]
    pub fn from_draft(id: TripId, draft: TripDraft) -> Self {
        let now = Utc::now();
        Self {
            id,
            title: draft.title,
            description: draft.description,
            start_date: draft.start_date,
            end_date: draft.end_date,
            cover_image: draft.cover_image,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Creation payload for a trip (everything the caller supplies)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripDraft {
    /// Trip title
    pub title: String,
    /// Optional free-form description
    pub description: Option<String>,
    /// First day of the trip
    pub start_date: DateTime<Utc>,
    /// Last day of the trip
    pub end_date: DateTime<Utc>,
    /// Optional cover image reference
    pub cover_image: Option<String>,
}

impl TripDraft {
    /// Validate input before it reaches the engine
    ///
    /// The start ≤ end invariant lives here, not in the engine.
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(Error::InvalidInput("Trip title cannot be empty".into()));
        }
        if self.start_date > self.end_date {
            return Err(Error::InvalidInput(
                "Trip start date must not be after its end date".into(),
            ));
        }
        Ok(())
    }
}

/// Partial update for a trip; `None` fields are left unchanged
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripPatch {
    /// New title, if changing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// New description, if changing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// New start date, if changing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<DateTime<Utc>>,
    /// New end date, if changing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,
    /// New cover image reference, if changing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
}

impl TripPatch {
    /// Apply this patch in place, refreshing the trip's `updated_at`
    pub fn apply(&self, trip: &mut Trip) {
        if let Some(title) = &self.title {
            trip.title.clone_from(title);
        }
        if let Some(description) = &self.description {
            trip.description = Some(description.clone());
        }
        if let Some(start_date) = self.start_date {
            trip.start_date = start_date;
        }
        if let Some(end_date) = self.end_date {
            trip.end_date = end_date;
        }
        if let Some(cover_image) = &self.cover_image {
            trip.cover_image = Some(cover_image.clone());
        }
        trip.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn draft() -> TripDraft {
        TripDraft {
            title: "Tokyo Adventure".to_string(),
            description: Some("Exploring the vibrant streets of Tokyo".to_string()),
            start_date: Utc.with_ymd_and_hms(2024, 3, 15, 0, 0, 0).unwrap(),
            end_date: Utc.with_ymd_and_hms(2024, 3, 22, 0, 0, 0).unwrap(),
            cover_image: None,
        }
    }

    #[test]
    fn test_trip_id_unique() {
        let id1 = TripId::new();
        let id2 = TripId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_trip_id_temporary_prefix() {
        let id = TripId::new_temporary();
        assert!(id.is_temporary());
        assert!(id.as_str().starts_with("temp-"));

        let server_id = TripId::new();
        assert!(!server_id.is_temporary());
    }

    #[test]
    fn test_trip_id_parse() {
        let id = TripId::new();
        let parsed: TripId = id.as_str().parse().unwrap();
        assert_eq!(id, parsed);

        assert!("   ".parse::<TripId>().is_err());
    }

    #[test]
    fn test_trip_from_draft() {
        let trip = Trip::from_draft(TripId::new(), draft());
        assert_eq!(trip.title, "Tokyo Adventure");
        assert_eq!(trip.created_at, trip.updated_at);
    }

    #[test]
    fn test_draft_validation() {
        assert!(draft().validate().is_ok());

        let mut empty_title = draft();
        empty_title.title = "   ".to_string();
        assert!(empty_title.validate().is_err());

        let mut inverted = draft();
        inverted.end_date = inverted.start_date - chrono::Duration::days(1);
        assert!(inverted.validate().is_err());
    }

    #[test]
    fn test_patch_apply_refreshes_updated_at() {
        let mut trip = Trip::from_draft(TripId::new(), draft());
        let before = trip.updated_at;

        let patch = TripPatch {
            title: Some("Kyoto Detour".to_string()),
            ..TripPatch::default()
        };
        patch.apply(&mut trip);

        assert_eq!(trip.title, "Kyoto Detour");
        assert_eq!(
            trip.description,
            Some("Exploring the vibrant streets of Tokyo".to_string())
        );
        assert!(trip.updated_at >= before);
    }
}
