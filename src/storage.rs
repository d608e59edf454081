use std::path::{Path, PathBuf};

use serde::Serialize;
use tokio::{fs, sync::Mutex};

use crate::errors::BoardError;
use crate::state::{Record, Store};

/// File-backed message store.
///
/// Every update rewrites the whole document. Updates go through `lock`, so
/// a second writer in this process cannot interleave a load with another
/// writer's save. Other processes touching the file are not coordinated.
#[derive(Debug)]
pub struct Storage {
    path: PathBuf,
    lock: Mutex<()>,
}

impl Storage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the store from disk. A missing file is an empty store.
    pub async fn load(&self) -> Result<Store, BoardError> {
        let _guard = self.lock.lock().await;
        self.read_store().await
    }

    /// Merge `record` into the persisted store and write it back.
    ///
    /// Returns the number of entries after the merge.
    pub async fn merge_and_persist(&self, record: Record) -> Result<usize, BoardError> {
        let _guard = self.lock.lock().await;

        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).await?;
        }

        let mut store = self.read_store().await?;
        store.insert(record.timestamp, record.message);
        self.write_store(&store).await?;

        Ok(store.len())
    }

    async fn read_store(&self) -> Result<Store, BoardError> {
        let data = match fs::read_to_string(&self.path).await {
            Ok(d) => d,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No store at {}, starting empty", self.path.display());
                return Ok(Store::new());
            }
            Err(e) => return Err(e.into()),
        };

        Ok(serde_json::from_str(&data)?)
    }

    async fn write_store(&self, store: &Store) -> Result<(), BoardError> {
        fs::write(&self.path, to_pretty_json(store)?).await?;
        Ok(())
    }
}

/// Serialize with four-space indentation.
pub fn to_pretty_json(store: &Store) -> Result<Vec<u8>, BoardError> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    store.serialize(&mut ser)?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Message;
    use std::sync::Arc;

    fn record(ts: &str, user: &str, text: &str) -> Record {
        Record {
            timestamp: ts.to_string(),
            message: Message {
                username: user.to_string(),
                message: text.to_string(),
            },
        }
    }

    #[tokio::test]
    async fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(dir.path().join("storage/data.json"));

        assert!(storage.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn first_write_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(dir.path().join("storage/data.json"));

        let count = storage
            .merge_and_persist(record("2024-05-01 10:00:00.000001", "alice", "hello"))
            .await
            .unwrap();

        assert_eq!(count, 1);
        assert!(storage.path().exists());

        let raw = std::fs::read_to_string(storage.path()).unwrap();
        let expected = "{\n    \"2024-05-01 10:00:00.000001\": {\n        \"username\": \"alice\",\n        \"message\": \"hello\"\n    }\n}";
        assert_eq!(raw, expected);
    }

    #[tokio::test]
    async fn merge_keeps_existing_entries() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(dir.path().join("data.json"));

        storage
            .merge_and_persist(record("2024-05-01 10:00:00.000001", "alice", "hello"))
            .await
            .unwrap();
        let count = storage
            .merge_and_persist(record("2024-05-01 10:00:01.000000", "bob", "hi"))
            .await
            .unwrap();
        assert_eq!(count, 2);

        let store = storage.load().await.unwrap();
        assert_eq!(store["2024-05-01 10:00:00.000001"].username, "alice");
        assert_eq!(store["2024-05-01 10:00:01.000000"].message, "hi");
    }

    #[tokio::test]
    async fn rewrite_without_changes_is_stable() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(dir.path().join("data.json"));
        storage
            .merge_and_persist(record("2024-05-01 10:00:00.000001", "alice", "hello"))
            .await
            .unwrap();

        let before = std::fs::read(storage.path()).unwrap();
        let store = storage.load().await.unwrap();
        storage.write_store(&store).await.unwrap();
        let after = std::fs::read(storage.path()).unwrap();

        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        std::fs::write(&path, "{ not json").unwrap();

        let storage = Storage::new(path);
        let err = storage
            .merge_and_persist(record("2024-05-01 10:00:00.000001", "alice", "hello"))
            .await
            .unwrap_err();
        assert!(matches!(err, BoardError::Json(_)));
    }

    #[tokio::test]
    async fn concurrent_writers_lose_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Arc::new(Storage::new(dir.path().join("data.json")));

        let mut handles = Vec::new();
        for i in 0..16 {
            let storage = storage.clone();
            handles.push(tokio::spawn(async move {
                let ts = format!("2024-05-01 10:00:00.{:06}", i);
                storage
                    .merge_and_persist(record(&ts, "user", "msg"))
                    .await
                    .unwrap();
            }));
        }
        for h in handles {
            h.await.unwrap();
        }

        assert_eq!(storage.load().await.unwrap().len(), 16);
    }
}
