//! Signature issuance for callers that cannot compute the HMAC themselves.

use axum::Json;
use axum::extract::State;

use signbridge_infra::auth::IssuedSignature;

use crate::http::extractors::basic_auth::AdminAuth;
use crate::state::AppState;

/// GET /auth - Sign the current time. Requires admin Basic credentials.
pub async fn issue_signature(
    _auth: AdminAuth,
    State(state): State<AppState>,
) -> Json<IssuedSignature> {
    let issued = state.signer.issue(chrono::Utc::now());
    tracing::debug!(timestamp = %issued.timestamp, "signature issued");
    Json(issued)
}
