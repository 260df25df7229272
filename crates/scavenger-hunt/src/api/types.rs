//! API request and response types.

use serde::{Deserialize, Serialize};

/// Query string of a scanned QR link, e.g. `/scan?code=abc123`.
#[derive(Debug, Deserialize)]
pub struct ScanQuery {
    pub code: Option<String>,
}

/// Registration form submitted from the scan page.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    #[serde(rename = "registrationNumber")]
    pub registration_number: Option<String>,

    /// Code carried over from the scan that prompted registration
    pub code: Option<String>,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub storage_healthy: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub participants: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
