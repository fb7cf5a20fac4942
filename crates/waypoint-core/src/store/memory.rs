//! In-memory store backend (useful for testing)

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use crate::error::{Error, Result};
use crate::store::DurableStore;

/// A [`DurableStore`] held entirely in memory
///
/// Backs unit tests and throwaway sessions. Writes can be forced to fail
/// to exercise the engine's swallow-and-log persistence contract.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, Vec<u8>>>,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `save`/`remove` fail with an IO error
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Overwrite a key directly, bypassing the failure switch
    ///
    /// Lets tests seed corrupt payloads.
    pub fn put_raw(&self, key: &str, bytes: Vec<u8>) {
        self.entries
            .write()
            .expect("store lock poisoned")
            .insert(key.to_string(), bytes);
    }

    fn check_writable(&self) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Error::Io(std::io::Error::other("simulated write failure")));
        }
        Ok(())
    }
}

#[async_trait]
impl DurableStore for MemoryStore {
    async fn load(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self
            .entries
            .read()
            .expect("store lock poisoned")
            .get(key)
            .cloned())
    }

    async fn save(&self, key: &str, bytes: Vec<u8>) -> Result<()> {
        self.check_writable()?;
        self.entries
            .write()
            .expect("store lock poisoned")
            .insert(key.to_string(), bytes);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.check_writable()?;
        self.entries
            .write()
            .expect("store lock poisoned")
            .remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_save_load_remove() {
        let store = MemoryStore::new();
        assert_eq!(store.load("snapshot").await.unwrap(), None);

        store.save("snapshot", b"payload".to_vec()).await.unwrap();
        assert_eq!(
            store.load("snapshot").await.unwrap(),
            Some(b"payload".to_vec())
        );

        store.remove("snapshot").await.unwrap();
        assert_eq!(store.load("snapshot").await.unwrap(), None);

        // Removing an absent key is fine
        store.remove("snapshot").await.unwrap();
    }

    #[tokio::test]
    async fn test_write_failure_switch() {
        let store = MemoryStore::new();
        store.set_fail_writes(true);
        assert!(store.save("snapshot", Vec::new()).await.is_err());
        assert!(store.remove("snapshot").await.is_err());

        store.set_fail_writes(false);
        assert!(store.save("snapshot", Vec::new()).await.is_ok());
    }
}
