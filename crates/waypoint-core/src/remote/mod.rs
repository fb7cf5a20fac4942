//! Remote service boundary
//!
//! The sync engine's sole network dependency. A real backend can replace
//! [`MockRemote`] without engine changes as long as the error kinds are
//! preserved: `Error::NotFound` for absent entities, `Error::Network` for
//! transient failures.

mod mock;

pub use mock::MockRemote;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Note, NoteDraft, NoteId, Trip, TripDraft, TripId, TripPatch};

/// CRUD contract exposed by the remote side
#[async_trait]
pub trait RemoteService: Send + Sync {
    /// List all trips, most recently started first
    async fn list_trips(&self) -> Result<Vec<Trip>>;

    /// Fetch one trip; `NotFound` if absent
    async fn get_trip(&self, id: &TripId) -> Result<Trip>;

    /// Create a trip; the server issues the id and timestamps
    async fn create_trip(&self, draft: TripDraft) -> Result<Trip>;

    /// Apply a partial update; `NotFound` if absent
    async fn update_trip(&self, id: &TripId, patch: TripPatch) -> Result<Trip>;

    /// Delete a trip and, server-side, every note attached to it;
    /// `NotFound` if absent
    async fn delete_trip(&self, id: &TripId) -> Result<()>;

    /// Create a note; `NotFound` if the parent trip is absent
    async fn create_note(&self, draft: NoteDraft) -> Result<Note>;

    /// Delete a note; `NotFound` if absent
    async fn delete_note(&self, id: &NoteId) -> Result<()>;

    /// List one trip's notes, newest first
    async fn list_notes(&self, trip_id: &TripId) -> Result<Vec<Note>>;
}
