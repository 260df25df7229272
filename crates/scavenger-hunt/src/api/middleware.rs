//! Scan admission and request logging middleware.

use super::identity::client_key;
use crate::error::HuntError;
use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use scan_admission::{Admission, AdmissionControl, AdmissionPolicy};
use std::{net::SocketAddr, sync::Arc, time::Instant};
use tracing::{debug, warn};

/// Admission state shared across scan requests.
#[derive(Clone)]
pub struct AdmissionState {
    pub control: Arc<AdmissionControl>,
    /// Use `X-Forwarded-For` as the client key
    pub trust_forwarded_for: bool,
}

impl AdmissionState {
    pub fn new(policy: AdmissionPolicy, trust_forwarded_for: bool) -> Self {
        Self {
            control: Arc::new(AdmissionControl::new(policy)),
            trust_forwarded_for,
        }
    }

    /// Admission state that lets effectively everything through, for tests.
    pub fn permissive() -> Self {
        Self::new(
            AdmissionPolicy::new(std::time::Duration::from_secs(1), u32::MAX),
            false,
        )
    }
}

/// Admission middleware for scan requests.
///
/// Runs before the scan handler, so a denied scan never reaches the
/// progress store. Returns 429 Too Many Requests when denied.
pub async fn admission_middleware(
    State(admission): State<AdmissionState>,
    request: Request,
    next: Next,
) -> Result<Response, HuntError> {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let client = client_key(request.headers(), peer, admission.trust_forwarded_for);

    match admission.control.admit(&client, Instant::now()) {
        Admission::Allowed => {
            debug!(%client, "Scan admitted");
            Ok(next.run(request).await)
        }
        Admission::Denied { retry_after } => {
            warn!(%client, ?retry_after, "Scan rate limit exceeded");
            Err(HuntError::RateLimited { retry_after })
        }
    }
}

/// Logging middleware for requests.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    debug!(%method, %uri, "Request started");

    let response = next.run(request).await;

    let duration = start.elapsed();
    let status = response.status();

    if status.is_success() {
        debug!(%method, %uri, %status, ?duration, "Request completed");
    } else {
        warn!(%method, %uri, %status, ?duration, "Request failed");
    }

    response
}
