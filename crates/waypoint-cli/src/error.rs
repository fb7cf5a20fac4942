use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] waypoint_core::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("No note content provided")]
    EmptyContent,
    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),
    #[error("Could not determine a data directory; pass --data-dir")]
    NoDataDir,
    #[error("Local data is unreadable. Run `waypoint reset` to start over")]
    StorageError,
    #[error("Reset aborted")]
    ResetAborted,
}
