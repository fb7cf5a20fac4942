//! Offline-first sync engine
//!
//! Orchestrates local optimistic mutation, the durable outbox queue,
//! merge-on-fetch reconciliation, and connectivity transitions. All state
//! lives behind one [`tokio::sync::Mutex`], held across each operation's
//! suspension points so overlapping invocations cannot interleave their
//! read-modify-write sequences.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::error::{Error, Result};
use crate::merge::merge_last_write_wins;
use crate::models::{
    Note, NoteDraft, NoteId, OutboxItem, OutboxOp, Trip, TripDraft, TripId, TripPatch,
};
use crate::remote::RemoteService;
use crate::store::{self, DurableStore, Snapshot, OUTBOX_KEY, SNAPSHOT_KEY};

/// Mutable engine state guarded by the engine mutex
#[derive(Debug, Clone)]
struct EngineState {
    trips: Vec<Trip>,
    notes: Vec<Note>,
    outbox: Vec<OutboxItem>,
    loading: bool,
    last_error: Option<String>,
    online: bool,
    initialized: bool,
    storage_error: bool,
}

impl EngineState {
    fn new() -> Self {
        Self {
            trips: Vec::new(),
            notes: Vec::new(),
            outbox: Vec::new(),
            loading: false,
            last_error: None,
            online: true,
            initialized: false,
            storage_error: false,
        }
    }
}

/// Point-in-time copy of the observable engine state
///
/// The presentation layer renders from this; it never holds the engine
/// lock.
#[derive(Debug, Clone)]
pub struct EngineSnapshot {
    /// All locally known trips
    pub trips: Vec<Trip>,
    /// All locally known notes
    pub notes: Vec<Note>,
    /// Pending mutations awaiting remote confirmation
    pub outbox: Vec<OutboxItem>,
    /// A fetch is in flight
    pub loading: bool,
    /// Most recent operation error, if any
    pub last_error: Option<String>,
    /// Connectivity flag
    pub online: bool,
    /// Startup load has completed (successfully or not)
    pub initialized: bool,
    /// Persisted data was unreadable; only a reset clears this
    pub storage_error: bool,
}

/// The sync engine
///
/// Owns the in-memory entity collections and the outbox; talks to the
/// remote through [`RemoteService`] and persists through [`DurableStore`].
pub struct SyncEngine {
    remote: Arc<dyn RemoteService>,
    store: Arc<dyn DurableStore>,
    state: Mutex<EngineState>,
}

impl SyncEngine {
    /// Create an engine over the given remote and store
    ///
    /// Starts online with empty collections; call [`load_persisted`]
    /// before first use.
    ///
    /// [`load_persisted`]: SyncEngine::load_persisted
    #[must_use]
    pub fn new(remote: Arc<dyn RemoteService>, store: Arc<dyn DurableStore>) -> Self {
        Self {
            remote,
            store,
            state: Mutex::new(EngineState::new()),
        }
    }

    // ---- startup & reset ----------------------------------------------

    /// Read both persisted namespaces at startup
    ///
    /// Any read or parse failure sets the storage-error flag instead of
    /// propagating; initialization completes either way so the caller
    /// never blocks on a broken store.
    pub async fn load_persisted(&self) {
        let mut state = self.state.lock().await;
        match self.read_persisted().await {
            Ok((snapshot, outbox)) => {
                if let Some(snapshot) = snapshot {
                    state.trips = snapshot.trips;
                    state.notes = snapshot.notes;
                }
                if let Some(outbox) = outbox {
                    state.outbox = outbox;
                }
                state.storage_error = false;
            }
            Err(error) => {
                tracing::error!("Failed to load persisted data: {error}");
                state.storage_error = true;
            }
        }
        state.initialized = true;
    }

    /// Erase both persisted namespaces and reset in-memory state
    ///
    /// The connectivity flag survives the reset; everything else,
    /// including the storage-error flag, is cleared.
    pub async fn clear_storage_and_reset(&self) -> Result<()> {
        let mut state = self.state.lock().await;
        self.store.remove(SNAPSHOT_KEY).await?;
        self.store.remove(OUTBOX_KEY).await?;

        let online = state.online;
        *state = EngineState::new();
        state.online = online;
        state.initialized = true;
        tracing::info!("Storage cleared and engine reset");
        Ok(())
    }

    // ---- fetch & merge ------------------------------------------------

    /// Fetch the remote trip list and merge it into local state
    ///
    /// No-op while offline. Errors are recorded in last-error and leave
    /// the collection unchanged.
    pub async fn fetch_trips(&self) -> Result<()> {
        let mut state = self.state.lock().await;
        self.fetch_trips_locked(&mut state).await
    }

    /// Fetch one trip's remote notes and merge them in
    ///
    /// Notes belonging to other trips are untouched. No-op while offline.
    pub async fn fetch_notes(&self, trip_id: &TripId) -> Result<()> {
        let mut state = self.state.lock().await;
        if !state.online {
            return Ok(());
        }
        match self.remote.list_notes(trip_id).await {
            Ok(server_notes) => {
                let notes = std::mem::take(&mut state.notes);
                let (for_trip, mut others): (Vec<_>, Vec<_>) =
                    notes.into_iter().partition(|note| note.trip_id == *trip_id);
                others.extend(merge_last_write_wins(for_trip, server_notes));
                state.notes = others;
                self.persist_snapshot(&state).await;
                tracing::debug!(trip = %trip_id, "Merged remote notes (last-write-wins)");
                Ok(())
            }
            Err(error) => {
                state.last_error = Some(error.to_string());
                Err(error)
            }
        }
    }

    // ---- optimistic mutation ------------------------------------------

    /// Create a trip, optimistically while offline
    ///
    /// Offline: the trip appears immediately under a temporary id and a
    /// create is queued. Online: the server entity is stored and its id
    /// returned; a failure leaves local state untouched.
    pub async fn create_trip(&self, draft: TripDraft) -> Result<TripId> {
        draft.validate()?;
        let mut state = self.state.lock().await;

        if !state.online {
            let temp_id = TripId::new_temporary();
            let trip = Trip::from_draft(temp_id.clone(), draft.clone());
            state.trips.insert(0, trip);
            self.persist_snapshot(&state).await;
            state.outbox.push(OutboxItem::new(OutboxOp::TripCreate {
                temp_id: temp_id.clone(),
                draft,
            }));
            self.persist_outbox(&state).await;
            return Ok(temp_id);
        }

        match self.remote.create_trip(draft).await {
            Ok(created) => {
                let id = created.id.clone();
                state.trips.insert(0, created);
                self.persist_snapshot(&state).await;
                Ok(id)
            }
            Err(error) => {
                state.last_error = Some(error.to_string());
                Err(error)
            }
        }
    }

    /// Create a note, optimistically while offline
    pub async fn create_note(&self, draft: NoteDraft) -> Result<NoteId> {
        draft.validate()?;
        let mut state = self.state.lock().await;

        if !state.online {
            let temp_id = NoteId::new_temporary();
            let note = Note::from_draft(temp_id.clone(), draft.clone());
            state.notes.insert(0, note);
            self.persist_snapshot(&state).await;
            state.outbox.push(OutboxItem::new(OutboxOp::NoteCreate {
                temp_id: temp_id.clone(),
                draft,
            }));
            self.persist_outbox(&state).await;
            return Ok(temp_id);
        }

        match self.remote.create_note(draft).await {
            Ok(created) => {
                let id = created.id.clone();
                state.notes.insert(0, created);
                self.persist_snapshot(&state).await;
                Ok(id)
            }
            Err(error) => {
                state.last_error = Some(error.to_string());
                Err(error)
            }
        }
    }

    /// Apply a partial update to a trip
    ///
    /// Fails with `NotFound` if the trip is unknown locally. Offline the
    /// patch is applied in place and queued; online the local entity is
    /// only replaced once the remote confirms, so a failure leaves
    /// nothing to roll back.
    pub async fn update_trip(&self, id: &TripId, patch: TripPatch) -> Result<()> {
        let mut state = self.state.lock().await;
        if !state.trips.iter().any(|trip| trip.id == *id) {
            return Err(Error::NotFound(format!("trip {id}")));
        }

        if !state.online {
            if let Some(trip) = state.trips.iter_mut().find(|trip| trip.id == *id) {
                patch.apply(trip);
            }
            self.persist_snapshot(&state).await;
            state.outbox.push(OutboxItem::new(OutboxOp::TripUpdate {
                id: id.clone(),
                patch,
            }));
            self.persist_outbox(&state).await;
            return Ok(());
        }

        match self.remote.update_trip(id, patch).await {
            Ok(updated) => {
                if let Some(slot) = state.trips.iter_mut().find(|trip| trip.id == *id) {
                    *slot = updated;
                }
                self.persist_snapshot(&state).await;
                Ok(())
            }
            Err(error) => {
                state.last_error = Some(error.to_string());
                Err(error)
            }
        }
    }

    /// Delete a trip and cascade-delete its notes
    ///
    /// Local-first regardless of connectivity. Online, a remote failure
    /// rolls the trip back (cascade-deleted notes are not restored) and
    /// the error propagates so the caller knows the delete did not stick
    /// remotely.
    pub async fn delete_trip(&self, id: &TripId) -> Result<()> {
        let mut state = self.state.lock().await;
        let position = state
            .trips
            .iter()
            .position(|trip| trip.id == *id)
            .ok_or_else(|| Error::NotFound(format!("trip {id}")))?;

        let removed = state.trips.remove(position);
        state.notes.retain(|note| note.trip_id != *id);
        self.persist_snapshot(&state).await;

        if !state.online {
            state
                .outbox
                .push(OutboxItem::new(OutboxOp::TripDelete { id: id.clone() }));
            self.persist_outbox(&state).await;
            return Ok(());
        }

        if let Err(error) = self.remote.delete_trip(id).await {
            state.trips.push(removed);
            state.last_error = Some(error.to_string());
            self.persist_snapshot(&state).await;
            return Err(error);
        }
        Ok(())
    }

    /// Delete a note
    ///
    /// Same local-first shape as [`delete_trip`], without a cascade.
    ///
    /// [`delete_trip`]: SyncEngine::delete_trip
    pub async fn delete_note(&self, id: &NoteId) -> Result<()> {
        let mut state = self.state.lock().await;
        let position = state
            .notes
            .iter()
            .position(|note| note.id == *id)
            .ok_or_else(|| Error::NotFound(format!("note {id}")))?;

        let removed = state.notes.remove(position);
        self.persist_snapshot(&state).await;

        if !state.online {
            state
                .outbox
                .push(OutboxItem::new(OutboxOp::NoteDelete { id: id.clone() }));
            self.persist_outbox(&state).await;
            return Ok(());
        }

        if let Err(error) = self.remote.delete_note(id).await {
            state.notes.push(removed);
            state.last_error = Some(error.to_string());
            self.persist_snapshot(&state).await;
            return Err(error);
        }
        Ok(())
    }

    // ---- outbox & connectivity ----------------------------------------

    /// Drain the outbox in FIFO order
    ///
    /// No-op while offline or when empty. Each item is dispatched
    /// sequentially; a transient failure increments its retry counter and
    /// leaves it queued for the next drain, while a remote `NotFound` is
    /// reconciled per operation rather than surfaced. The drain itself
    /// never fails; the remaining queue length tells the caller what is
    /// still pending.
    pub async fn process_outbox(&self) {
        let mut state = self.state.lock().await;
        self.process_outbox_locked(&mut state).await;
    }

    /// Flip the connectivity flag
    ///
    /// Transitioning to online drains the outbox fully, then fetches and
    /// merges trips. Pipeline errors land in last-error; they never
    /// revert the flag and are not surfaced to the caller.
    pub async fn set_online(&self, online: bool) {
        let mut state = self.state.lock().await;
        state.online = online;
        if !online {
            return;
        }

        self.process_outbox_locked(&mut state).await;
        match self.fetch_trips_locked(&mut state).await {
            Ok(()) => tracing::info!("Sync completed: outbox drained and trips merged"),
            Err(error) => tracing::warn!("Sync after reconnect failed: {error}"),
        }
    }

    // ---- observable state ---------------------------------------------

    /// Copy out the observable state
    pub async fn snapshot(&self) -> EngineSnapshot {
        let state = self.state.lock().await;
        EngineSnapshot {
            trips: state.trips.clone(),
            notes: state.notes.clone(),
            outbox: state.outbox.clone(),
            loading: state.loading,
            last_error: state.last_error.clone(),
            online: state.online,
            initialized: state.initialized,
            storage_error: state.storage_error,
        }
    }

    /// Look up a trip by id
    pub async fn trip_by_id(&self, id: &TripId) -> Option<Trip> {
        let state = self.state.lock().await;
        state.trips.iter().find(|trip| trip.id == *id).cloned()
    }

    /// One trip's notes, newest first
    pub async fn notes_by_trip(&self, trip_id: &TripId) -> Vec<Note> {
        let state = self.state.lock().await;
        let mut notes: Vec<Note> = state
            .notes
            .iter()
            .filter(|note| note.trip_id == *trip_id)
            .cloned()
            .collect();
        notes.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        notes
    }

    /// Current connectivity flag
    pub async fn is_online(&self) -> bool {
        self.state.lock().await.online
    }

    /// Number of queued outbox items
    pub async fn outbox_len(&self) -> usize {
        self.state.lock().await.outbox.len()
    }

    // ---- internals ----------------------------------------------------

    async fn read_persisted(&self) -> Result<(Option<Snapshot>, Option<Vec<OutboxItem>>)> {
        let snapshot = match self.store.load(SNAPSHOT_KEY).await? {
            Some(bytes) => Some(store::decode::<Snapshot>(SNAPSHOT_KEY, &bytes)?),
            None => None,
        };
        let outbox = match self.store.load(OUTBOX_KEY).await? {
            Some(bytes) => Some(store::decode::<Vec<OutboxItem>>(OUTBOX_KEY, &bytes)?),
            None => None,
        };
        Ok((snapshot, outbox))
    }

    async fn fetch_trips_locked(&self, state: &mut EngineState) -> Result<()> {
        if !state.online {
            return Ok(());
        }
        state.loading = true;
        state.last_error = None;

        match self.remote.list_trips().await {
            Ok(server_trips) => {
                let local = std::mem::take(&mut state.trips);
                state.trips = merge_last_write_wins(local, server_trips);
                state.loading = false;
                self.persist_snapshot(state).await;
                tracing::debug!("Merged remote trips (last-write-wins)");
                Ok(())
            }
            Err(error) => {
                state.loading = false;
                state.last_error = Some(error.to_string());
                Err(error)
            }
        }
    }

    async fn process_outbox_locked(&self, state: &mut EngineState) {
        if !state.online || state.outbox.is_empty() {
            return;
        }

        // Drain a snapshot of the queue; items enqueued mid-drain wait
        // for the next invocation.
        let queued = state.outbox.clone();
        for item in queued {
            match self.dispatch_item(state, &item).await {
                Ok(()) => {
                    state.outbox.retain(|other| other.id != item.id);
                    self.persist_outbox(state).await;
                }
                Err(error) => {
                    tracing::warn!(
                        op = item.op.label(),
                        "Outbox item failed, keeping for retry: {error}"
                    );
                    if let Some(kept) = state.outbox.iter_mut().find(|other| other.id == item.id) {
                        kept.retries += 1;
                    }
                    self.persist_outbox(state).await;
                }
            }
        }
    }

    async fn dispatch_item(&self, state: &mut EngineState, item: &OutboxItem) -> Result<()> {
        match &item.op {
            OutboxOp::TripCreate { temp_id, draft } => {
                let created = self.remote.create_trip(draft.clone()).await?;
                // Matched by the temp id carried on the item, not the new
                // server id
                if let Some(slot) = state.trips.iter_mut().find(|trip| trip.id == *temp_id) {
                    *slot = created;
                }
                self.persist_snapshot(state).await;
                Ok(())
            }
            OutboxOp::TripUpdate { id, patch } => {
                match self.remote.update_trip(id, patch.clone()).await {
                    Ok(updated) => {
                        if let Some(slot) = state.trips.iter_mut().find(|trip| trip.id == *id) {
                            *slot = updated;
                        }
                        self.persist_snapshot(state).await;
                        Ok(())
                    }
                    Err(Error::NotFound(_)) => {
                        // Remote is the source of truth: the trip no
                        // longer exists, so the queued update is moot
                        tracing::warn!(trip = %id, "Trip gone on remote, dropping local copy");
                        state.trips.retain(|trip| trip.id != *id);
                        self.persist_snapshot(state).await;
                        Ok(())
                    }
                    Err(error) => Err(error),
                }
            }
            OutboxOp::TripDelete { id } => {
                match self.remote.delete_trip(id).await {
                    Ok(()) => {}
                    Err(Error::NotFound(_)) => {
                        tracing::debug!(trip = %id, "Trip already deleted on remote");
                    }
                    Err(error) => return Err(error),
                }
                // Already removed locally at delete time; re-filter anyway
                state.trips.retain(|trip| trip.id != *id);
                state.notes.retain(|note| note.trip_id != *id);
                self.persist_snapshot(state).await;
                Ok(())
            }
            OutboxOp::NoteCreate { temp_id, draft } => {
                match self.remote.create_note(draft.clone()).await {
                    Ok(created) => {
                        if let Some(slot) = state.notes.iter_mut().find(|note| note.id == *temp_id)
                        {
                            *slot = created;
                        }
                        self.persist_snapshot(state).await;
                        Ok(())
                    }
                    Err(Error::NotFound(_)) => {
                        tracing::warn!(note = %temp_id, "Parent trip gone on remote, dropping local note");
                        state.notes.retain(|note| note.id != *temp_id);
                        self.persist_snapshot(state).await;
                        Ok(())
                    }
                    Err(error) => Err(error),
                }
            }
            OutboxOp::NoteDelete { id } => {
                match self.remote.delete_note(id).await {
                    Ok(()) => {}
                    Err(Error::NotFound(_)) => {
                        tracing::debug!(note = %id, "Note already deleted on remote");
                    }
                    Err(error) => return Err(error),
                }
                state.notes.retain(|note| note.id != *id);
                self.persist_snapshot(state).await;
                Ok(())
            }
        }
    }

    /// Persist the entity snapshot; failures are logged, never surfaced
    /// to the caller of the triggering mutation
    async fn persist_snapshot(&self, state: &EngineState) {
        let snapshot = Snapshot {
            trips: state.trips.clone(),
            notes: state.notes.clone(),
        };
        match store::encode(&snapshot) {
            Ok(bytes) => {
                if let Err(error) = self.store.save(SNAPSHOT_KEY, bytes).await {
                    tracing::warn!("Failed to persist snapshot: {error}");
                }
            }
            Err(error) => tracing::warn!("Failed to encode snapshot: {error}"),
        }
    }

    /// Persist the outbox; same swallow-and-log contract as the snapshot
    async fn persist_outbox(&self, state: &EngineState) {
        match store::encode(&state.outbox) {
            Ok(bytes) => {
                if let Err(error) = self.store.save(OUTBOX_KEY, bytes).await {
                    tracing::warn!("Failed to persist outbox: {error}");
                }
            }
            Err(error) => tracing::warn!("Failed to encode outbox: {error}"),
        }
    }
}
