//! Per-client admission control for scan requests.
//!
//! Each client key (normally the caller's network address) gets a fixed
//! window. The first admitted call opens the window, at most
//! [`AdmissionPolicy::limit`] calls are admitted inside it, and any further
//! call is denied with the time left until the window closes.

mod limiter;
mod sweeper;

pub use limiter::{Admission, AdmissionControl, AdmissionPolicy};
pub use sweeper::spawn_sweeper;
