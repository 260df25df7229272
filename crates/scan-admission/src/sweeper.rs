//! Background cleanup of elapsed admission windows.

use crate::limiter::AdmissionControl;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tracing::debug;

/// Periodically drop elapsed windows so idle clients do not accumulate.
pub fn spawn_sweeper(control: Arc<AdmissionControl>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // First tick completes immediately
        ticker.tick().await;

        loop {
            ticker.tick().await;

            let removed = control.sweep(Instant::now());
            if removed > 0 {
                debug!(
                    "Swept {} expired admission windows ({} still tracked)",
                    removed,
                    control.tracked_clients()
                );
            }
        }
    })
}
