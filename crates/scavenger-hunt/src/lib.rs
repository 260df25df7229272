//! Scavenger hunt tracker - QR scan ingestion service.
//!
//! Participants scan QR codes printed around the venue. Each scan link hits
//! `/scan?code=...`; the participant's registration number travels in a
//! cookie set on first registration. This service:
//! - Throttles scans per client address
//! - Records each catalog code once per participant
//! - Renders progress and a completion message once every code is collected

pub mod api;
pub mod config;
pub mod error;

pub use config::Config;
pub use error::HuntError;
