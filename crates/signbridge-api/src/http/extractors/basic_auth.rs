//! HTTP Basic authentication for the admin endpoints.
//!
//! Credentials come from `security.admin_user` / `security.admin_pass`
//! (`LOG_USER` / `LOG_PASS`). When either is unset every request is refused.

use axum::extract::FromRequestParts;
use axum::http::header;
use axum::http::request::Parts;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use secrecy::ExposeSecret;

use signbridge_infra::auth::credentials_match;

use crate::http::error::AppError;
use crate::state::AppState;

/// Marker for a request that presented valid admin credentials.
pub struct AdminAuth;

impl FromRequestParts<AppState> for AdminAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let (user, pass) = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_basic)
            .ok_or_else(|| AppError::Unauthorized("Authentication required.".to_string()))?;

        let admin = &state.admin;
        if credentials_match(&admin.admin_user, admin.admin_pass.expose_secret(), &user, &pass) {
            Ok(AdminAuth)
        } else {
            tracing::warn!(user = %user, "admin authentication failed");
            Err(AppError::Unauthorized("Invalid credentials.".to_string()))
        }
    }
}

/// Decode `Basic base64(user:pass)`.
fn parse_basic(value: &str) -> Option<(String, String)> {
    let (scheme, encoded) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }
    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (user, pass) = decoded.split_once(':')?;
    Some((user.to_string(), pass.to_string()))
}
