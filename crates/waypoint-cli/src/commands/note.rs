use std::path::Path;

use waypoint_core::{NoteDraft, NoteId, TripId};

use crate::commands::common::{format_note_line, AppContext};
use crate::error::CliError;

pub async fn run_add(trip_id: &str, content_parts: &[String], data_dir: &Path) -> Result<(), CliError> {
    let content = content_parts.join(" ");
    if content.trim().is_empty() {
        return Err(CliError::EmptyContent);
    }

    let ctx = AppContext::open(data_dir).await?;
    ctx.ensure_readable().await?;

    let trip_id: TripId = trip_id.parse()?;
    let id = ctx
        .engine
        .create_note(NoteDraft { trip_id, content })
        .await?;
    if id.is_temporary() {
        tracing::info!("Offline; note queued for sync");
    }
    println!("{id}");
    Ok(())
}

pub async fn run_list(trip_id: &str, as_json: bool, data_dir: &Path) -> Result<(), CliError> {
    let ctx = AppContext::open(data_dir).await?;
    ctx.ensure_readable().await?;

    let trip_id: TripId = trip_id.parse()?;
    ctx.engine.fetch_notes(&trip_id).await.ok();
    let notes = ctx.engine.notes_by_trip(&trip_id).await;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&notes)?);
    } else if notes.is_empty() {
        println!("No notes for this trip yet.");
    } else {
        for note in &notes {
            println!("{}", format_note_line(note));
        }
    }
    Ok(())
}

pub async fn run_delete(id: &str, data_dir: &Path) -> Result<(), CliError> {
    let ctx = AppContext::open(data_dir).await?;
    ctx.ensure_readable().await?;

    let note_id: NoteId = id.parse()?;
    ctx.engine.delete_note(&note_id).await?;
    println!("Deleted {note_id}");
    Ok(())
}
