//! Simulated remote backend

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use crate::error::{Error, Result};
use crate::models::{Note, NoteDraft, NoteId, Trip, TripDraft, TripId, TripPatch};
use crate::remote::RemoteService;
use crate::store::{self, DurableStore};

/// Storage key for the fake server's own state when it is made durable
const REMOTE_STATE_KEY: &str = "remote";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct RemoteState {
    trips: HashMap<String, Trip>,
    notes: HashMap<String, Note>,
}

/// In-process stand-in for the real backend
///
/// Simulates latency on every call, supports one-shot failure injection
/// for tests and demos, and can optionally persist its tables through a
/// [`DurableStore`] so a CLI session talks to the same fake server across
/// invocations.
pub struct MockRemote {
    state: Mutex<RemoteState>,
    latency: Duration,
    fail_next: Mutex<Option<Error>>,
    store: Option<Arc<dyn DurableStore>>,
}

impl MockRemote {
    /// Create an empty backend with no latency
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(RemoteState::default()),
            latency: Duration::ZERO,
            fail_next: Mutex::new(None),
            store: None,
        }
    }

    /// Set the simulated per-call latency
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Seed the backend with a fixture trip and note
    #[must_use]
    pub fn with_seed_data(self) -> Self {
        let start = Utc.with_ymd_and_hms(2024, 3, 15, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 3, 22, 0, 0, 0).unwrap();
        let created = Utc.with_ymd_and_hms(2024, 3, 10, 0, 0, 0).unwrap();

        let trip = Trip {
            id: TripId::new(),
            title: "Tokyo Adventure".to_string(),
            description: Some("Exploring the vibrant streets of Tokyo".to_string()),
            start_date: start,
            end_date: end,
            cover_image: None,
            created_at: created,
            updated_at: created,
        };
        let noted = Utc.with_ymd_and_hms(2024, 3, 16, 0, 0, 0).unwrap();
        let note = Note {
            id: NoteId::new(),
            trip_id: trip.id.clone(),
            content: "Visited Sensoji Temple - absolutely beautiful!".to_string(),
            created_at: noted,
            updated_at: noted,
        };

        let mut state = RemoteState::default();
        state.trips.insert(trip.id.as_str().to_string(), trip);
        state.notes.insert(note.id.as_str().to_string(), note);
        Self {
            state: Mutex::new(state),
            ..self
        }
    }

    /// Attach a store and load any previously persisted server state
    ///
    /// A fresh store takes whatever is already in the tables (seed data
    /// included) so later loads hand back the same ids instead of
    /// re-minting the fixture on every attach.
    pub async fn with_store(mut self, store: Arc<dyn DurableStore>) -> Result<Self> {
        match store.load(REMOTE_STATE_KEY).await? {
            Some(bytes) => {
                let state: RemoteState = store::decode(REMOTE_STATE_KEY, &bytes)?;
                self.state = Mutex::new(state);
            }
            None => {
                let state = self.state.lock().await;
                store.save(REMOTE_STATE_KEY, store::encode(&*state)?).await?;
            }
        }
        self.store = Some(store);
        Ok(self)
    }

    /// Make the next call fail with `error`, then resume normal service
    pub async fn fail_next(&self, error: Error) {
        *self.fail_next.lock().await = Some(error);
    }

    async fn simulate_call(&self) -> Result<()> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        if let Some(error) = self.fail_next.lock().await.take() {
            return Err(error);
        }
        Ok(())
    }

    async fn persist(&self, state: &RemoteState) -> Result<()> {
        if let Some(store) = &self.store {
            store.save(REMOTE_STATE_KEY, store::encode(state)?).await?;
        }
        Ok(())
    }
}

impl Default for MockRemote {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RemoteService for MockRemote {
    async fn list_trips(&self) -> Result<Vec<Trip>> {
        self.simulate_call().await?;
        let state = self.state.lock().await;
        let mut trips: Vec<Trip> = state.trips.values().cloned().collect();
        trips.sort_by(|a, b| b.start_date.cmp(&a.start_date));
        Ok(trips)
    }

    async fn get_trip(&self, id: &TripId) -> Result<Trip> {
        self.simulate_call().await?;
        let state = self.state.lock().await;
        state
            .trips
            .get(id.as_str())
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("trip {id}")))
    }

    async fn create_trip(&self, draft: TripDraft) -> Result<Trip> {
        self.simulate_call().await?;
        let trip = Trip::from_draft(TripId::new(), draft);
        let mut state = self.state.lock().await;
        state.trips.insert(trip.id.as_str().to_string(), trip.clone());
        self.persist(&state).await?;
        Ok(trip)
    }

    async fn update_trip(&self, id: &TripId, patch: TripPatch) -> Result<Trip> {
        self.simulate_call().await?;
        let mut state = self.state.lock().await;
        let trip = state
            .trips
            .get_mut(id.as_str())
            .ok_or_else(|| Error::NotFound(format!("trip {id}")))?;
        patch.apply(trip);
        let updated = trip.clone();
        self.persist(&state).await?;
        Ok(updated)
    }

    async fn delete_trip(&self, id: &TripId) -> Result<()> {
        self.simulate_call().await?;
        let mut state = self.state.lock().await;
        if state.trips.remove(id.as_str()).is_none() {
            return Err(Error::NotFound(format!("trip {id}")));
        }
        // Server-side cascade
        state.notes.retain(|_, note| note.trip_id != *id);
        self.persist(&state).await?;
        Ok(())
    }

    async fn create_note(&self, draft: NoteDraft) -> Result<Note> {
        self.simulate_call().await?;
        let mut state = self.state.lock().await;
        if !state.trips.contains_key(draft.trip_id.as_str()) {
            return Err(Error::NotFound(format!("trip {}", draft.trip_id)));
        }
        let note = Note::from_draft(NoteId::new(), draft);
        state.notes.insert(note.id.as_str().to_string(), note.clone());
        self.persist(&state).await?;
        Ok(note)
    }

    async fn delete_note(&self, id: &NoteId) -> Result<()> {
        self.simulate_call().await?;
        let mut state = self.state.lock().await;
        if state.notes.remove(id.as_str()).is_none() {
            return Err(Error::NotFound(format!("note {id}")));
        }
        self.persist(&state).await?;
        Ok(())
    }

    async fn list_notes(&self, trip_id: &TripId) -> Result<Vec<Note>> {
        self.simulate_call().await?;
        let state = self.state.lock().await;
        let mut notes: Vec<Note> = state
            .notes
            .values()
            .filter(|note| note.trip_id == *trip_id)
            .cloned()
            .collect();
        notes.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(notes)
    }
}
