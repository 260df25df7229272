//! Registration cookie and client identification.

use crate::error::HuntError;
use axum::http::{header, HeaderMap, HeaderValue};
use std::net::SocketAddr;
use tracing::debug;

/// Cookie carrying the participant's registration number.
pub const REGISTRATION_COOKIE: &str = "registrationNumber";

/// Key used for requests whose peer address is unknown.
const UNKNOWN_CLIENT: &str = "unknown";

/// Check that a registration number is non-empty uppercase ASCII alphanumeric.
pub fn validate_registration_number(input: &str) -> Result<String, HuntError> {
    let valid = !input.is_empty()
        && input
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit());

    if valid {
        Ok(input.to_string())
    } else {
        Err(HuntError::InvalidRegistrationFormat(input.to_string()))
    }
}

/// Registration number from the request cookies.
///
/// A cookie that does not pass format validation is treated as absent.
pub fn registration_from_headers(headers: &HeaderMap) -> Option<String> {
    let value = headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == REGISTRATION_COOKIE)
        .map(|(_, value)| value.trim().trim_matches('"'))?;

    match validate_registration_number(value) {
        Ok(number) => Some(number),
        Err(_) => {
            debug!("Ignoring malformed registration cookie");
            None
        }
    }
}

/// `Set-Cookie` value for a registration number.
///
/// Session cookie, http-only, same-site lax; `Secure` in production.
pub fn registration_cookie(registration_number: &str, secure: bool) -> Result<HeaderValue, HuntError> {
    let mut cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax",
        REGISTRATION_COOKIE, registration_number
    );
    if secure {
        cookie.push_str("; Secure");
    }

    HeaderValue::from_str(&cookie).map_err(|e| HuntError::Internal(e.to_string()))
}

/// Key identifying the caller for admission control.
pub fn client_key(
    headers: &HeaderMap,
    peer: Option<SocketAddr>,
    trust_forwarded_for: bool,
) -> String {
    if trust_forwarded_for {
        let forwarded = headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty());

        if let Some(addr) = forwarded {
            return addr.to_string();
        }
    }

    peer.map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}
