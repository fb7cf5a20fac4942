//! File-backed store backend

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::store::DurableStore;

/// A [`DurableStore`] keeping one JSON file per key under a base directory
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open a store rooted at `dir`, creating the directory if needed
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    /// The directory this store writes into
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl DurableStore for FileStore {
    async fn load(&self, key: &str) -> Result<Option<Vec<u8>>> {
        match tokio::fs::read(self.path_for(key)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(None),
            Err(error) => Err(error.into()),
        }
    }

    async fn save(&self, key: &str, bytes: Vec<u8>) -> Result<()> {
        // Stage then rename; the live key is replaced atomically
        let tmp = self.dir.join(format!("{key}.json.tmp"));
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, self.path_for(key)).await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        match tokio::fs::remove_file(self.path_for(key)).await {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(()),
            Err(error) => Err(error.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_round_trip_on_disk() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FileStore::open(tmp.path().join("waypoint")).unwrap();

        assert_eq!(store.load("outbox").await.unwrap(), None);
        store.save("outbox", b"[]".to_vec()).await.unwrap();
        assert_eq!(store.load("outbox").await.unwrap(), Some(b"[]".to_vec()));

        store.remove("outbox").await.unwrap();
        assert_eq!(store.load("outbox").await.unwrap(), None);
        store.remove("outbox").await.unwrap();
    }

    #[tokio::test]
    async fn test_save_replaces_previous_value() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FileStore::open(tmp.path()).unwrap();

        store.save("snapshot", b"first".to_vec()).await.unwrap();
        store.save("snapshot", b"second".to_vec()).await.unwrap();
        assert_eq!(
            store.load("snapshot").await.unwrap(),
            Some(b"second".to_vec())
        );
    }
}
