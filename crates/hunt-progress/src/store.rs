//! Progress store with idempotent scan ingestion.

use crate::backend::{BackendHandle, MemoryBackend, ParticipantBackend};
use crate::error::ProgressError;
use crate::types::{Catalog, Participant, ParticipantState};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::timeout;
use tracing::{debug, info, instrument, warn};

/// Default upper bound for a single backend call.
pub const DEFAULT_STORAGE_TIMEOUT: Duration = Duration::from_secs(5);

/// Tracks which catalog codes each registration number has collected.
///
/// Scans for the same registration number are serialized through a
/// per-key lock held across load, append and save, so concurrent scans
/// of the same new code produce exactly one insert.
pub struct ProgressStore {
    backend: Arc<BackendHandle>,
    catalog: Catalog,
    storage_timeout: Duration,
    key_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl ProgressStore {
    pub fn new(backend: Arc<BackendHandle>, catalog: Catalog, storage_timeout: Duration) -> Self {
        info!(
            "Progress store initialized (catalog_size={}, storage_timeout={:?})",
            catalog.len(),
            storage_timeout
        );

        Self {
            backend,
            catalog,
            storage_timeout,
            key_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Store backed by process memory only.
    pub fn in_memory(catalog: Catalog) -> Self {
        let backend: Arc<dyn ParticipantBackend> = Arc::new(MemoryBackend::new());
        Self::new(
            Arc::new(BackendHandle::from_backend(backend)),
            catalog,
            DEFAULT_STORAGE_TIMEOUT,
        )
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Record that `registration_number` scanned `code`.
    ///
    /// Creates the participant on first scan. Re-scanning a collected code
    /// returns the current state without writing.
    #[instrument(skip(self))]
    pub async fn record_scan(
        &self,
        registration_number: &str,
        code: &str,
    ) -> Result<ParticipantState, ProgressError> {
        if !self.catalog.contains(code) {
            warn!("Rejected scan of unknown code");
            return Err(ProgressError::InvalidCode(code.to_string()));
        }

        let key_lock = self.acquire_key_lock(registration_number).await;
        let result = {
            let _guard = key_lock.lock().await;
            self.apply_scan(registration_number, code).await
        };
        self.release_key_lock(registration_number, key_lock).await;

        result
    }

    /// Current progress. Unknown registration numbers read as empty.
    #[instrument(skip(self))]
    pub async fn get_progress(
        &self,
        registration_number: &str,
    ) -> Result<ParticipantState, ProgressError> {
        let backend = self.bounded(self.backend.get()).await?;

        Ok(self
            .bounded(backend.load(registration_number))
            .await?
            .map(|p| ParticipantState::from_participant(&p, &self.catalog))
            .unwrap_or_else(|| ParticipantState::empty(registration_number, &self.catalog)))
    }

    /// Round trip to the backend.
    pub async fn ping(&self) -> Result<(), ProgressError> {
        let backend = self.bounded(self.backend.get()).await?;
        self.bounded(backend.ping()).await
    }

    /// Number of participants known to the backend.
    pub async fn participant_count(&self) -> Result<usize, ProgressError> {
        let backend = self.bounded(self.backend.get()).await?;
        self.bounded(backend.count()).await
    }

    async fn apply_scan(
        &self,
        registration_number: &str,
        code: &str,
    ) -> Result<ParticipantState, ProgressError> {
        let backend = self.bounded(self.backend.get()).await?;

        let mut participant = match self.bounded(backend.load(registration_number)).await? {
            Some(p) => p,
            None => {
                debug!("Creating participant on first scan");
                Participant::new(registration_number)
            }
        };

        if participant.add_component(code) {
            self.bounded(backend.save(&participant)).await?;
            info!(
                collected = participant.components.len(),
                "Component collected"
            );
        } else {
            debug!("Component already collected, nothing to write");
        }

        Ok(ParticipantState::from_participant(&participant, &self.catalog))
    }

    async fn bounded<T, F>(&self, operation: F) -> Result<T, ProgressError>
    where
        F: Future<Output = Result<T, ProgressError>>,
    {
        timeout(self.storage_timeout, operation).await?
    }

    async fn acquire_key_lock(&self, registration_number: &str) -> Arc<Mutex<()>> {
        let mut locks = self.key_locks.lock().await;
        locks
            .entry(registration_number.to_string())
            .or_default()
            .clone()
    }

    /// Drop the table entry once no other request holds a reference to it.
    async fn release_key_lock(&self, registration_number: &str, key_lock: Arc<Mutex<()>>) {
        let mut locks = self.key_locks.lock().await;
        // Released under the table lock so no other release can observe our reference
        drop(key_lock);
        let unused = locks
            .get(registration_number)
            .map(|lock| Arc::strong_count(lock) == 1)
            .unwrap_or(false);
        if unused {
            locks.remove(registration_number);
        }
    }

    #[cfg(test)]
    async fn tracked_keys(&self) -> usize {
        self.key_locks.lock().await.len()
    }
}
