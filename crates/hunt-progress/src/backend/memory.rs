//! In-memory participant backend.

use super::ParticipantBackend;
use crate::error::ProgressError;
use crate::types::Participant;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

/// Non-durable backend for tests or when persistence is disabled.
#[derive(Default)]
pub struct MemoryBackend {
    participants: RwLock<HashMap<String, Participant>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self {
            participants: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl ParticipantBackend for MemoryBackend {
    async fn load(&self, registration_number: &str) -> Result<Option<Participant>, ProgressError> {
        let participants = self.participants.read().await;
        Ok(participants.get(registration_number).cloned())
    }

    async fn save(&self, participant: &Participant) -> Result<(), ProgressError> {
        let mut participants = self.participants.write().await;
        participants.insert(participant.registration_number.clone(), participant.clone());
        debug!(
            registration_number = %participant.registration_number,
            "Memory backend: saved participant"
        );
        Ok(())
    }

    async fn ping(&self) -> Result<(), ProgressError> {
        Ok(())
    }

    async fn count(&self) -> Result<usize, ProgressError> {
        Ok(self.participants.read().await.len())
    }
}
