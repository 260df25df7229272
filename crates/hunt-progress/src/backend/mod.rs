//! Participant persistence backends.
//!
//! The store treats persistence as a key-value map from registration
//! number to [`Participant`]. Backends are selected by a connection string:
//!
//! - `memory://` keeps everything in process memory
//! - `file:///var/lib/hunt` (or a bare path) stores one JSON file per participant

mod file;
mod memory;

pub use file::FileBackend;
pub use memory::MemoryBackend;

use crate::error::ProgressError;
use crate::types::Participant;
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info};

/// Key-value persistence for participants.
#[async_trait]
pub trait ParticipantBackend: Send + Sync {
    /// Fetch a participant, `None` if it was never stored.
    async fn load(&self, registration_number: &str) -> Result<Option<Participant>, ProgressError>;

    /// Durably write a participant, replacing any previous record.
    async fn save(&self, participant: &Participant) -> Result<(), ProgressError>;

    /// Cheap round trip used by health checks.
    async fn ping(&self) -> Result<(), ProgressError>;

    /// Number of stored participants.
    async fn count(&self) -> Result<usize, ProgressError>;

    /// Release resources held by the backend.
    async fn close(&self) -> Result<(), ProgressError> {
        Ok(())
    }
}

/// Backend location parsed from a connection string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendUrl {
    Memory,
    File(PathBuf),
}

impl BackendUrl {
    pub fn parse(url: &str) -> Result<Self, ProgressError> {
        let url = url.trim();

        if url.is_empty() {
            return Err(ProgressError::Config("empty storage url".into()));
        }

        if url == "memory://" || url == "memory" {
            return Ok(BackendUrl::Memory);
        }

        if let Some(path) = url.strip_prefix("file://") {
            if path.is_empty() {
                return Err(ProgressError::Config("file:// url without a path".into()));
            }
            return Ok(BackendUrl::File(PathBuf::from(path)));
        }

        if url.contains("://") {
            return Err(ProgressError::Config(format!(
                "unsupported storage url scheme: {}",
                url
            )));
        }

        Ok(BackendUrl::File(PathBuf::from(url)))
    }
}

/// Open the backend described by `url`.
pub async fn open_backend(url: &str) -> Result<Arc<dyn ParticipantBackend>, ProgressError> {
    match BackendUrl::parse(url)? {
        BackendUrl::Memory => {
            info!("Using in-memory participant storage (data will be lost on restart)");
            Ok(Arc::new(MemoryBackend::new()))
        }
        BackendUrl::File(dir) => {
            let backend = FileBackend::open(dir).await?;
            Ok(Arc::new(backend))
        }
    }
}

/// Process-wide handle to the participant backend.
///
/// The backend is opened on first use and reused afterwards. Call
/// [`BackendHandle::shutdown`] once the server has stopped accepting
/// requests; later calls are no-ops.
pub struct BackendHandle {
    url: String,
    cell: OnceCell<Arc<dyn ParticipantBackend>>,
    closed: OnceCell<()>,
}

impl BackendHandle {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            cell: OnceCell::new(),
            closed: OnceCell::new(),
        }
    }

    /// Wrap an already opened backend.
    pub fn from_backend(backend: Arc<dyn ParticipantBackend>) -> Self {
        Self {
            url: String::new(),
            cell: OnceCell::new_with(Some(backend)),
            closed: OnceCell::new(),
        }
    }

    /// Get the backend, opening it if this is the first call.
    pub async fn get(&self) -> Result<Arc<dyn ParticipantBackend>, ProgressError> {
        let backend = self
            .cell
            .get_or_try_init(|| async {
                debug!(url = %self.url, "Opening participant backend");
                open_backend(&self.url).await
            })
            .await?;

        Ok(backend.clone())
    }

    pub fn is_open(&self) -> bool {
        self.cell.initialized()
    }

    /// Close the backend if it was ever opened.
    pub async fn shutdown(&self) -> Result<(), ProgressError> {
        let Some(backend) = self.cell.get() else {
            return Ok(());
        };

        if self.closed.set(()).is_err() {
            return Ok(());
        }

        backend.close().await?;
        info!("Participant backend closed");
        Ok(())
    }
}
