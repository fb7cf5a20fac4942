use std::io::{self, BufRead, Write};
use std::path::Path;

use crate::commands::common::AppContext;
use crate::error::CliError;

pub async fn run_sync(data_dir: &Path) -> Result<(), CliError> {
    let ctx = AppContext::open(data_dir).await?;
    ctx.ensure_readable().await?;

    if !ctx.engine.is_online().await {
        println!("Offline; nothing synced. Go online with `waypoint online`.");
        return Ok(());
    }

    let before = ctx.engine.outbox_len().await;
    ctx.engine.process_outbox().await;
    ctx.engine.fetch_trips().await?;
    let after = ctx.engine.outbox_len().await;

    println!("Synced: {} of {before} queued item(s) confirmed", before - after);
    if after > 0 {
        println!("{after} item(s) still queued; run `waypoint sync` again to retry");
    }
    Ok(())
}

pub async fn run_outbox(as_json: bool, data_dir: &Path) -> Result<(), CliError> {
    let ctx = AppContext::open(data_dir).await?;
    ctx.ensure_readable().await?;

    let outbox = ctx.engine.snapshot().await.outbox;
    if as_json {
        println!("{}", serde_json::to_string_pretty(&outbox)?);
    } else if outbox.is_empty() {
        println!("Outbox is empty.");
    } else {
        for item in &outbox {
            println!(
                "{}  {}  queued {}  retries {}",
                item.id,
                item.op.label(),
                item.queued_at.format("%Y-%m-%d %H:%M:%S"),
                item.retries
            );
        }
    }
    Ok(())
}

pub async fn run_online(data_dir: &Path) -> Result<(), CliError> {
    let ctx = AppContext::open(data_dir).await?;
    ctx.ensure_readable().await?;

    ctx.save_connectivity(true)?;
    ctx.engine.set_online(true).await;

    let snapshot = ctx.engine.snapshot().await;
    match snapshot.last_error {
        Some(error) => println!("Online; sync finished with an error: {error}"),
        None => println!("Online; outbox drained and trips merged."),
    }
    Ok(())
}

pub async fn run_offline(data_dir: &Path) -> Result<(), CliError> {
    let ctx = AppContext::open(data_dir).await?;
    ctx.save_connectivity(false)?;
    ctx.engine.set_online(false).await;
    println!("Offline; mutations will queue until `waypoint online`.");
    Ok(())
}

pub async fn run_status(data_dir: &Path) -> Result<(), CliError> {
    let ctx = AppContext::open(data_dir).await?;
    let snapshot = ctx.engine.snapshot().await;

    println!(
        "connectivity: {}",
        if snapshot.online { "online" } else { "offline" }
    );
    println!("trips: {}", snapshot.trips.len());
    println!("notes: {}", snapshot.notes.len());
    println!("outbox: {} pending", snapshot.outbox.len());
    if snapshot.storage_error {
        println!("storage: UNREADABLE — run `waypoint reset` to start over");
    }
    if let Some(error) = snapshot.last_error {
        println!("last error: {error}");
    }
    Ok(())
}

pub async fn run_reset(yes: bool, data_dir: &Path) -> Result<(), CliError> {
    if !yes {
        print!("This erases all local trips, notes, and queued changes. Continue? [y/N] ");
        io::stdout().flush()?;
        let mut answer = String::new();
        io::stdin().lock().read_line(&mut answer)?;
        if !matches!(answer.trim(), "y" | "Y" | "yes") {
            return Err(CliError::ResetAborted);
        }
    }

    match AppContext::open(data_dir).await {
        Ok(ctx) => ctx.engine.clear_storage_and_reset().await?,
        Err(_) => {
            // Even the fake server's namespace may be unreadable; a
            // destructive reset still has to work
            std::fs::remove_dir_all(data_dir)?;
        }
    }
    println!("Local storage cleared.");
    Ok(())
}
