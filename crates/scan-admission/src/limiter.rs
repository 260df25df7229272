//! Fixed-window limiter keyed by client.

use dashmap::DashMap;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Window length and number of calls admitted per window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdmissionPolicy {
    pub window: Duration,
    pub limit: u32,
}

impl AdmissionPolicy {
    /// Create a policy. A zero limit is raised to one.
    pub fn new(window: Duration, limit: u32) -> Self {
        Self {
            window,
            limit: limit.max(1),
        }
    }
}

impl Default for AdmissionPolicy {
    fn default() -> Self {
        Self::new(Duration::from_secs(60), 1)
    }
}

/// Outcome of an admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Allowed,
    Denied { retry_after: Duration },
}

impl Admission {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Admission::Allowed)
    }
}

#[derive(Debug, Clone, Copy)]
struct WindowState {
    started_at: Instant,
    count: u32,
}

/// Shared admission state for all clients.
pub struct AdmissionControl {
    policy: AdmissionPolicy,
    windows: DashMap<String, WindowState>,
}

impl AdmissionControl {
    pub fn new(policy: AdmissionPolicy) -> Self {
        info!(
            "Scan admission control initialized (window={:?}, limit={})",
            policy.window, policy.limit
        );

        Self {
            policy,
            windows: DashMap::new(),
        }
    }

    pub fn policy(&self) -> AdmissionPolicy {
        self.policy
    }

    /// Check and count a call from `client_key` at `now`.
    ///
    /// The map entry stays locked for the whole check, so concurrent calls
    /// for one key cannot both take the last slot in a window.
    pub fn admit(&self, client_key: &str, now: Instant) -> Admission {
        let mut entry = self
            .windows
            .entry(client_key.to_string())
            .or_insert(WindowState {
                started_at: now,
                count: 0,
            });
        let state = entry.value_mut();

        // Elapsed windows reset lazily
        if now.saturating_duration_since(state.started_at) >= self.policy.window {
            *state = WindowState {
                started_at: now,
                count: 0,
            };
        }

        if state.count < self.policy.limit {
            state.count += 1;
            return Admission::Allowed;
        }

        let retry_after = (state.started_at + self.policy.window).saturating_duration_since(now);
        debug!(client = %client_key, ?retry_after, "Scan denied");

        Admission::Denied { retry_after }
    }

    /// Drop windows that have fully elapsed. Returns how many were removed.
    pub fn sweep(&self, now: Instant) -> usize {
        let before = self.windows.len();
        let window = self.policy.window;

        self.windows
            .retain(|_, state| now.saturating_duration_since(state.started_at) < window);

        before.saturating_sub(self.windows.len())
    }

    /// Number of clients with a tracked window.
    pub fn tracked_clients(&self) -> usize {
        self.windows.len()
    }
}

impl Default for AdmissionControl {
    fn default() -> Self {
        Self::new(AdmissionPolicy::default())
    }
}
