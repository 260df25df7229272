//! Scavenger hunt progress tracking.
//!
//! Each participant is keyed by a registration number and collects codes
//! from a fixed [`Catalog`]. Scans are idempotent: a code counts once no
//! matter how often it is scanned, and a participant is complete once every
//! catalog code has been collected.

pub mod backend;
mod error;
mod store;
mod types;

pub use backend::{open_backend, BackendHandle, BackendUrl, FileBackend, MemoryBackend, ParticipantBackend};
pub use error::ProgressError;
pub use store::{ProgressStore, DEFAULT_STORAGE_TIMEOUT};
pub use types::*;
