//! HTTP request handlers.

use super::identity::{
    registration_cookie, registration_from_headers, validate_registration_number,
};
use super::pages;
use super::types::{HealthResponse, RegisterForm, ScanQuery};
use super::AppState;
use crate::error::HuntError;
use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
    Form, Json,
};
use tracing::{info, warn};

/// Health check endpoint. Round-trips a ping to participant storage.
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let check = async {
        state.progress.ping().await?;
        state.progress.participant_count().await
    };

    match check.await {
        Ok(participants) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "ok".to_string(),
                storage_healthy: true,
                participants: Some(participants),
                error: None,
            }),
        ),
        Err(e) => {
            warn!("Storage health check failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(HealthResponse {
                    status: "error".to_string(),
                    storage_healthy: false,
                    participants: None,
                    error: Some(e.to_string()),
                }),
            )
        }
    }
}

/// Handle a scanned QR link.
///
/// Without a registration cookie the participant is asked to register;
/// the scanned code travels along in the form.
pub async fn scan(
    State(state): State<AppState>,
    Query(query): Query<ScanQuery>,
    headers: HeaderMap,
) -> Result<Response, HuntError> {
    let code = query.code.unwrap_or_default();

    if !state.progress.catalog().contains(&code) {
        warn!(%code, "Scan with invalid QR code");
        return Err(HuntError::InvalidCode(code));
    }

    let Some(registration_number) = registration_from_headers(&headers) else {
        info!(%code, "Scan without registration cookie, showing registration form");
        return Ok(Html(pages::registration_form(&code)).into_response());
    };

    let progress = state
        .progress
        .record_scan(&registration_number, &code)
        .await?;

    info!(
        %registration_number,
        progress = %pages::progress_label(&progress),
        complete = progress.is_complete(),
        "Scan recorded"
    );

    Ok(Html(pages::progress(&progress)).into_response())
}

/// Register a participant and record the scan that brought them here.
pub async fn register(
    State(state): State<AppState>,
    Form(form): Form<RegisterForm>,
) -> Result<Response, HuntError> {
    let registration_number =
        validate_registration_number(form.registration_number.as_deref().unwrap_or_default())
            .inspect_err(|_| warn!("Registration with malformed registration number"))?;
    let code = form.code.unwrap_or_default();

    let progress = state
        .progress
        .record_scan(&registration_number, &code)
        .await?;

    info!(
        %registration_number,
        progress = %pages::progress_label(&progress),
        "Participant registered"
    );

    let cookie = registration_cookie(&registration_number, state.secure_cookies)?;

    Ok((
        [(header::SET_COOKIE, cookie)],
        Html(pages::progress(&progress)),
    )
        .into_response())
}
