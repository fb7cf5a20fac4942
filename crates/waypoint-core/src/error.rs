//! Error types for waypoint-core

use thiserror::Error;

/// Result type alias using waypoint-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in waypoint-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Entity absent locally or on the remote; the outbox drain
    /// matches on this variant to reconcile already-deleted records
    #[error("Not found: {0}")]
    NotFound(String),

    /// Transient remote/network failure; retried via the outbox
    #[error("Network error: {0}")]
    Network(String),

    /// Persisted data unreadable or unparseable; cleared only by an
    /// explicit user-initiated reset
    #[error("Storage corruption: {0}")]
    StorageCorruption(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether this error is the remote's "entity absent" condition.
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_is_distinguishable() {
        assert!(Error::NotFound("trip 1".into()).is_not_found());
        assert!(!Error::Network("connection reset".into()).is_not_found());
        assert!(!Error::StorageCorruption("bad json".into()).is_not_found());
    }
}
