//! Data models for Waypoint

mod note;
mod outbox;
mod trip;

pub use note::{Note, NoteDraft, NoteId};
pub use outbox::{OutboxItem, OutboxOp};
pub use trip::{Trip, TripDraft, TripId, TripPatch, TEMP_ID_PREFIX};
