use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use waypoint_core::remote::MockRemote;
use waypoint_core::store::FileStore;
use waypoint_core::{Note, SyncEngine, Trip};

use crate::error::CliError;

const CONNECTIVITY_FILE: &str = "connectivity";
const SIMULATED_LATENCY_MS: u64 = 150;

/// Engine plus the data directory it lives in
pub struct AppContext {
    pub engine: SyncEngine,
    data_dir: PathBuf,
}

impl AppContext {
    /// Build the engine over file-backed stores and load persisted state
    ///
    /// The fake server keeps its own namespace under the data dir so a
    /// session's "remote" survives between invocations. The persisted
    /// connectivity flag is restored without triggering a sync pipeline;
    /// `waypoint online` and `waypoint sync` do that explicitly.
    pub async fn open(data_dir: &Path) -> Result<Self, CliError> {
        let local = Arc::new(FileStore::open(data_dir.join("local"))?);
        let remote_store = Arc::new(FileStore::open(data_dir.join("remote"))?);

        let remote = MockRemote::new()
            .with_latency(Duration::from_millis(SIMULATED_LATENCY_MS))
            .with_seed_data()
            .with_store(remote_store)
            .await?;

        let engine = SyncEngine::new(Arc::new(remote), local);
        engine.load_persisted().await;

        if !read_connectivity(data_dir) {
            engine.set_online(false).await;
        }

        Ok(Self {
            engine,
            data_dir: data_dir.to_path_buf(),
        })
    }

    /// Fail fast when the persisted store is unreadable
    ///
    /// Every command except `status` and `reset` goes through this.
    pub async fn ensure_readable(&self) -> Result<(), CliError> {
        if self.engine.snapshot().await.storage_error {
            return Err(CliError::StorageError);
        }
        Ok(())
    }

    /// Persist the connectivity flag for the next invocation
    pub fn save_connectivity(&self, online: bool) -> Result<(), CliError> {
        let contents = if online { "online" } else { "offline" };
        std::fs::write(self.data_dir.join(CONNECTIVITY_FILE), contents)?;
        Ok(())
    }
}

fn read_connectivity(data_dir: &Path) -> bool {
    match std::fs::read_to_string(data_dir.join(CONNECTIVITY_FILE)) {
        Ok(contents) => contents.trim() != "offline",
        Err(_) => true,
    }
}

/// Parse a YYYY-MM-DD argument into a UTC midnight instant
pub fn parse_date(value: &str) -> Result<DateTime<Utc>, CliError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|datetime| datetime.and_utc())
        .ok_or_else(|| CliError::InvalidDate(value.to_string()))
}

/// One-line trip rendering for list output
pub fn format_trip_line(trip: &Trip) -> String {
    let pending = if trip.id.is_temporary() {
        " [pending sync]"
    } else {
        ""
    };
    format!(
        "{}  {} — {}  {}{}",
        trip.id,
        trip.start_date.format("%Y-%m-%d"),
        trip.end_date.format("%Y-%m-%d"),
        trip.title,
        pending
    )
}

/// One-line note rendering for list output
pub fn format_note_line(note: &Note) -> String {
    let pending = if note.id.is_temporary() {
        " [pending sync]"
    } else {
        ""
    };
    format!(
        "{}  {}  {}{}",
        note.id,
        note.created_at.format("%Y-%m-%d %H:%M"),
        note.content,
        pending
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date() {
        let parsed = parse_date("2024-03-15").unwrap();
        assert_eq!(parsed.format("%Y-%m-%dT%H:%M:%S").to_string(), "2024-03-15T00:00:00");

        assert!(parse_date("not a date").is_err());
        assert!(parse_date("2024-13-40").is_err());
    }
}
