use std::path::Path;

use waypoint_core::{TripDraft, TripId, TripPatch};

use crate::commands::common::{format_note_line, format_trip_line, parse_date, AppContext};
use crate::error::CliError;

pub struct AddArgs {
    pub title: String,
    pub start: String,
    pub end: String,
    pub description: Option<String>,
    pub cover_image: Option<String>,
}

pub async fn run_add(args: AddArgs, data_dir: &Path) -> Result<(), CliError> {
    let ctx = AppContext::open(data_dir).await?;
    ctx.ensure_readable().await?;

    let draft = TripDraft {
        title: args.title,
        description: args.description,
        start_date: parse_date(&args.start)?,
        end_date: parse_date(&args.end)?,
        cover_image: args.cover_image,
    };

    let id = ctx.engine.create_trip(draft).await?;
    if id.is_temporary() {
        tracing::info!("Offline; trip queued for sync");
    }
    println!("{id}");
    Ok(())
}

pub async fn run_list(as_json: bool, data_dir: &Path) -> Result<(), CliError> {
    let ctx = AppContext::open(data_dir).await?;
    ctx.ensure_readable().await?;

    ctx.engine.fetch_trips().await.ok();
    let mut trips = ctx.engine.snapshot().await.trips;
    trips.sort_by(|a, b| b.start_date.cmp(&a.start_date));

    if as_json {
        println!("{}", serde_json::to_string_pretty(&trips)?);
    } else if trips.is_empty() {
        println!("No trips yet. Create one with `waypoint trip add`.");
    } else {
        for trip in &trips {
            println!("{}", format_trip_line(trip));
        }
    }
    Ok(())
}

pub async fn run_show(id: &str, as_json: bool, data_dir: &Path) -> Result<(), CliError> {
    let ctx = AppContext::open(data_dir).await?;
    ctx.ensure_readable().await?;

    let trip_id: TripId = id.parse()?;
    ctx.engine.fetch_notes(&trip_id).await.ok();

    let trip = ctx
        .engine
        .trip_by_id(&trip_id)
        .await
        .ok_or_else(|| waypoint_core::Error::NotFound(format!("trip {trip_id}")))?;
    let notes = ctx.engine.notes_by_trip(&trip_id).await;

    if as_json {
        let payload = serde_json::json!({ "trip": trip, "notes": notes });
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    println!("{}", format_trip_line(&trip));
    if let Some(description) = &trip.description {
        println!("  {description}");
    }
    for note in &notes {
        println!("  {}", format_note_line(note));
    }
    Ok(())
}

pub struct UpdateArgs {
    pub id: String,
    pub title: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub description: Option<String>,
    pub cover_image: Option<String>,
}

pub async fn run_update(args: UpdateArgs, data_dir: &Path) -> Result<(), CliError> {
    let ctx = AppContext::open(data_dir).await?;
    ctx.ensure_readable().await?;

    let trip_id: TripId = args.id.parse()?;
    let patch = TripPatch {
        title: args.title,
        description: args.description,
        start_date: args.start.as_deref().map(parse_date).transpose()?,
        end_date: args.end.as_deref().map(parse_date).transpose()?,
        cover_image: args.cover_image,
    };

    ctx.engine.update_trip(&trip_id, patch).await?;
    println!("Updated {trip_id}");
    Ok(())
}

pub async fn run_delete(id: &str, data_dir: &Path) -> Result<(), CliError> {
    let ctx = AppContext::open(data_dir).await?;
    ctx.ensure_readable().await?;

    let trip_id: TripId = id.parse()?;
    ctx.engine.delete_trip(&trip_id).await?;
    println!("Deleted {trip_id}");
    Ok(())
}
