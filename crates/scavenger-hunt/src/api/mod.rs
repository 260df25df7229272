//! HTTP API for the scavenger hunt.

mod handlers;
mod identity;
mod middleware;
pub mod pages;
mod types;

pub use handlers::*;
pub use identity::{
    client_key, registration_cookie, registration_from_headers, validate_registration_number,
    REGISTRATION_COOKIE,
};
pub use middleware::{admission_middleware, logging_middleware, AdmissionState};
pub use types::*;

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use hunt_progress::ProgressStore;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Participant progress
    pub progress: Arc<ProgressStore>,
    /// Mark the registration cookie `Secure`
    pub secure_cookies: bool,
}

impl AppState {
    /// Create new application state.
    pub fn new(progress: Arc<ProgressStore>, secure_cookies: bool) -> Self {
        Self {
            progress,
            secure_cookies,
        }
    }
}

/// Create the API router.
///
/// Routes are served at the root and again under `/api`. Both scan routes
/// share one admission state.
pub fn create_router(state: AppState, admission: AdmissionState) -> Router {
    let routes = Router::new()
        // Scans are throttled per client before anything else happens
        .route(
            "/scan",
            get(handlers::scan).layer(axum_middleware::from_fn_with_state(
                admission,
                admission_middleware,
            )),
        )
        .route("/register", post(handlers::register))
        // Health checks (no rate limiting)
        .route("/health", get(handlers::health))
        .route("/test-db", get(handlers::health));

    Router::new()
        .merge(routes.clone())
        .nest("/api", routes)
        .layer(axum_middleware::from_fn(logging_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
