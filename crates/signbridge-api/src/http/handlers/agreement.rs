//! Start-signature endpoint called by the content repository workflow.

use std::time::Instant;

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use serde::Serialize;
use uuid::Uuid;

use signbridge_core::validation::StartSignature;
use signbridge_types::request::StartSignatureRequest;

use crate::http::error::AppError;
use crate::http::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartResponse {
    pub agreement_id: String,
    pub node_id: String,
}

/// POST /start (alias POST /agreements) - Send a repository document for signature.
///
/// The body carries its own `signature`/`timestamp` pair, checked before
/// any field validation. The workflow advance runs in the background and
/// never affects this response.
pub async fn start_signature(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ApiResponse<StartResponse>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let request: StartSignatureRequest = serde_json::from_slice(&body)
        .map_err(|e| AppError::BadRequest(format!("Invalid request body: {e}")))?;

    state.signer.verify(
        request.signature.as_deref(),
        request.timestamp.as_deref(),
        chrono::Utc::now(),
    )?;

    let start_request = StartSignature::from_request(&request)?;
    tracing::info!(
        %request_id,
        node_id = %start_request.node_id,
        attach_id = %start_request.attach_id,
        document = %start_request.file_name(),
        recipients = ?start_request.emails,
        "signature requested"
    );

    let node_id = start_request.node_id.clone();
    let started = state.signature_service.start(start_request).await?;

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(Json(ApiResponse::success(
        StartResponse {
            agreement_id: started.agreement_id,
            node_id,
        },
        request_id,
        elapsed,
    )))
}
