//! Waypoint CLI - an offline-first travel journal from the command line
//!
//! Thin presentation layer over the waypoint-core sync engine: renders
//! its observable state and forwards commands to its operations.

mod cli;
mod commands;
mod error;
#[cfg(test)]
mod tests;

use std::path::PathBuf;

use clap::Parser;

use crate::cli::{Cli, Commands, NoteCommands, TripCommands};
use crate::commands::{note, sync, trip};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("waypoint=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();
    let data_dir = resolve_data_dir(cli.data_dir)?;

    match cli.command {
        Commands::Trip { command } => match command {
            TripCommands::Add {
                title,
                start,
                end,
                description,
                cover_image,
            } => {
                trip::run_add(
                    trip::AddArgs {
                        title,
                        start,
                        end,
                        description,
                        cover_image,
                    },
                    &data_dir,
                )
                .await?;
            }
            TripCommands::List { json } => trip::run_list(json, &data_dir).await?,
            TripCommands::Show { id, json } => trip::run_show(&id, json, &data_dir).await?,
            TripCommands::Update {
                id,
                title,
                start,
                end,
                description,
                cover_image,
            } => {
                trip::run_update(
                    trip::UpdateArgs {
                        id,
                        title,
                        start,
                        end,
                        description,
                        cover_image,
                    },
                    &data_dir,
                )
                .await?;
            }
            TripCommands::Delete { id } => trip::run_delete(&id, &data_dir).await?,
        },
        Commands::Note { command } => match command {
            NoteCommands::Add { trip_id, content } => {
                note::run_add(&trip_id, &content, &data_dir).await?;
            }
            NoteCommands::List { trip_id, json } => {
                note::run_list(&trip_id, json, &data_dir).await?;
            }
            NoteCommands::Delete { id } => note::run_delete(&id, &data_dir).await?,
        },
        Commands::Sync => sync::run_sync(&data_dir).await?,
        Commands::Outbox { json } => sync::run_outbox(json, &data_dir).await?,
        Commands::Online => sync::run_online(&data_dir).await?,
        Commands::Offline => sync::run_offline(&data_dir).await?,
        Commands::Status => sync::run_status(&data_dir).await?,
        Commands::Reset { yes } => sync::run_reset(yes, &data_dir).await?,
    }

    Ok(())
}

fn resolve_data_dir(overridden: Option<PathBuf>) -> Result<PathBuf, CliError> {
    if let Some(dir) = overridden {
        return Ok(dir);
    }
    dirs::data_dir()
        .map(|dir| dir.join("waypoint"))
        .ok_or(CliError::NoDataDir)
}
