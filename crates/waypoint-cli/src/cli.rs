use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "waypoint")]
#[command(about = "An offline-first travel journal from the command line")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Optional data directory (defaults to the platform data dir)
    #[arg(long, global = true, value_name = "PATH")]
    pub data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage trips
    Trip {
        #[command(subcommand)]
        command: TripCommands,
    },
    /// Manage notes within a trip
    Note {
        #[command(subcommand)]
        command: NoteCommands,
    },
    /// Drain the outbox and merge remote changes
    Sync,
    /// List pending outbox items
    Outbox {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Go online (drains the outbox, then fetches and merges)
    Online,
    /// Go offline (mutations queue locally until reconnect)
    Offline,
    /// Show connectivity, queue depth, and any recorded error
    Status,
    /// Erase all local data, including a corrupt store
    Reset {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
pub enum TripCommands {
    /// Create a new trip
    #[command(alias = "new")]
    Add {
        /// Trip title
        title: String,
        /// First day (YYYY-MM-DD)
        #[arg(long, value_name = "DATE")]
        start: String,
        /// Last day (YYYY-MM-DD)
        #[arg(long, value_name = "DATE")]
        end: String,
        /// Optional description
        #[arg(long)]
        description: Option<String>,
        /// Optional cover image reference
        #[arg(long, value_name = "REF")]
        cover_image: Option<String>,
    },
    /// List trips, most recently started first
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show one trip and its notes
    Show {
        /// Trip ID
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Update fields of an existing trip
    Update {
        /// Trip ID
        id: String,
        /// New title
        #[arg(long)]
        title: Option<String>,
        /// New first day (YYYY-MM-DD)
        #[arg(long, value_name = "DATE")]
        start: Option<String>,
        /// New last day (YYYY-MM-DD)
        #[arg(long, value_name = "DATE")]
        end: Option<String>,
        /// New description
        #[arg(long)]
        description: Option<String>,
        /// New cover image reference
        #[arg(long, value_name = "REF")]
        cover_image: Option<String>,
    },
    /// Delete a trip and all of its notes
    Delete {
        /// Trip ID
        id: String,
    },
}

#[derive(Subcommand)]
pub enum NoteCommands {
    /// Add a note to a trip
    #[command(alias = "new")]
    Add {
        /// Owning trip ID
        trip_id: String,
        /// Note content
        content: Vec<String>,
    },
    /// List a trip's notes, newest first
    List {
        /// Owning trip ID
        trip_id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete a note
    Delete {
        /// Note ID
        id: String,
    },
}
