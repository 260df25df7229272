//! File-per-participant JSON backend.

use super::ParticipantBackend;
use crate::error::ProgressError;
use crate::types::Participant;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::fs;
use tracing::{debug, info};

const RECORD_EXTENSION: &str = "json";

/// Sequence for temp file names; each write gets its own file.
static TEMP_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Stores each participant as `<hex(registration number)>.json` in a directory.
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    /// Open (and create if needed) the data directory.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, ProgressError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).await?;

        info!("Using file participant storage at {:?}", dir);
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn record_path(&self, registration_number: &str) -> PathBuf {
        self.dir.join(format!(
            "{}.{}",
            hex::encode(registration_number.as_bytes()),
            RECORD_EXTENSION
        ))
    }

    /// A temp path next to `path` that no other write in this process uses.
    fn temp_path(path: &Path) -> PathBuf {
        let seq = TEMP_SEQUENCE.fetch_add(1, Ordering::Relaxed);
        path.with_extension(format!("{}.{}.tmp", std::process::id(), seq))
    }
}

#[async_trait]
impl ParticipantBackend for FileBackend {
    async fn load(&self, registration_number: &str) -> Result<Option<Participant>, ProgressError> {
        let path = self.record_path(registration_number);

        let data = match fs::read(&path).await {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let participant: Participant = serde_json::from_slice(&data)?;
        Ok(Some(participant))
    }

    async fn save(&self, participant: &Participant) -> Result<(), ProgressError> {
        let path = self.record_path(&participant.registration_number);
        let data = serde_json::to_vec(participant)?;

        // Write atomically using temp file + rename
        let temp_path = Self::temp_path(&path);
        if let Err(e) = fs::write(&temp_path, &data).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }
        fs::rename(&temp_path, &path).await?;

        debug!(
            registration_number = %participant.registration_number,
            "Saved participant ({} bytes) to {:?}",
            data.len(),
            path
        );
        Ok(())
    }

    async fn ping(&self) -> Result<(), ProgressError> {
        let metadata = fs::metadata(&self.dir).await?;
        if !metadata.is_dir() {
            return Err(ProgressError::StorageUnavailable(format!(
                "{:?} is not a directory",
                self.dir
            )));
        }
        Ok(())
    }

    async fn count(&self) -> Result<usize, ProgressError> {
        let mut entries = fs::read_dir(&self.dir).await?;
        let mut count = 0;

        while let Some(entry) = entries.next_entry().await? {
            let is_record = entry
                .path()
                .extension()
                .map(|ext| ext == RECORD_EXTENSION)
                .unwrap_or(false);
            if is_record {
                count += 1;
            }
        }

        Ok(count)
    }

    async fn close(&self) -> Result<(), ProgressError> {
        debug!("File backend at {:?} closed", self.dir);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_open_creates_directory() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("nested").join("participants");

        let backend = FileBackend::open(&dir).await.unwrap();

        assert!(dir.is_dir());
        backend.ping().await.unwrap();
        assert_eq!(backend.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_save_and_reload() {
        let temp_dir = TempDir::new().unwrap();
        let backend = FileBackend::open(temp_dir.path()).await.unwrap();

        let mut participant = Participant::new("A12345");
        participant.add_component("abc123");
        participant.add_component("def456");
        backend.save(&participant).await.unwrap();

        // A fresh backend on the same directory sees the record
        let reopened = FileBackend::open(temp_dir.path()).await.unwrap();
        let stored = reopened.load("A12345").await.unwrap().unwrap();

        assert_eq!(stored.registration_number, "A12345");
        assert_eq!(stored.components, vec!["abc123", "def456"]);
        assert_eq!(reopened.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_load_missing_returns_none() {
        let temp_dir = TempDir::new().unwrap();
        let backend = FileBackend::open(temp_dir.path()).await.unwrap();

        assert!(backend.load("UNKNOWN123").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_leaves_no_temp_files() {
        let temp_dir = TempDir::new().unwrap();
        let backend = FileBackend::open(temp_dir.path()).await.unwrap();

        backend.save(&Participant::new("B1")).await.unwrap();
        backend.save(&Participant::new("B1")).await.unwrap();

        let names: Vec<_> = std::fs::read_dir(temp_dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names.len(), 1);
        assert!(names[0].ends_with(".json"));
    }

    #[test]
    fn test_temp_paths_are_unique() {
        let path = Path::new("/data/4131.json");

        let first = FileBackend::temp_path(path);
        let second = FileBackend::temp_path(path);

        assert_ne!(first, second);
        assert_eq!(first.parent(), path.parent());
        assert!(first.to_string_lossy().ends_with(".tmp"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_saves_leave_one_valid_record() {
        let temp_dir = TempDir::new().unwrap();
        let backend = std::sync::Arc::new(FileBackend::open(temp_dir.path()).await.unwrap());
        let codes = ["abc123", "def456", "ghi789", "jkl012", "mno345"];

        let tasks: Vec<_> = (0..20)
            .map(|i| {
                let backend = backend.clone();
                let mut participant = Participant::new("D1");
                participant.add_component(codes[i % codes.len()]);
                tokio::spawn(async move { backend.save(&participant).await })
            })
            .collect();

        for task in futures::future::join_all(tasks).await {
            task.unwrap().unwrap();
        }

        let names: Vec<_> = std::fs::read_dir(temp_dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, vec![format!("{}.json", hex::encode("D1"))]);

        let stored = backend.load("D1").await.unwrap().unwrap();
        assert_eq!(stored.components.len(), 1);
        assert_eq!(backend.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_corrupt_record_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let backend = FileBackend::open(temp_dir.path()).await.unwrap();

        std::fs::write(backend.record_path("C1"), b"not json").unwrap();

        assert!(matches!(
            backend.load("C1").await,
            Err(ProgressError::Serialization(_))
        ));
    }

    #[tokio::test]
    async fn test_ping_fails_when_directory_removed() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("gone");
        let backend = FileBackend::open(&dir).await.unwrap();

        std::fs::remove_dir_all(&dir).unwrap();

        assert!(matches!(
            backend.ping().await,
            Err(ProgressError::StorageUnavailable(_))
        ));
    }
}
