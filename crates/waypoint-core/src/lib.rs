//! waypoint-core - Core library for Waypoint
//!
//! This crate contains the entity models, durable persistence, the
//! simulated remote service, and the offline-first sync engine shared by
//! all Waypoint interfaces.

pub mod engine;
pub mod error;
pub mod merge;
pub mod models;
pub mod remote;
pub mod store;

pub use engine::{EngineSnapshot, SyncEngine};
pub use error::{Error, Result};
pub use models::{Note, NoteDraft, NoteId, Trip, TripDraft, TripId, TripPatch};
