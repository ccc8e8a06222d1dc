//! Provider webhook endpoint.
//!
//! The provider verifies the URL with HEAD/GET before delivering events and
//! expects its client id echoed back. Event deliveries are always
//! acknowledged with 200 once the body parses; processing failures are
//! logged only, so the provider never retries into a half-applied state.

use std::collections::HashMap;

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, HeaderName, HeaderValue};
use axum::response::{IntoResponse, Response};
use serde_json::{Value, json};

use signbridge_core::webhook::processor::EventOutcome;
use signbridge_types::event::WebhookEvent;

use crate::http::error::AppError;
use crate::state::AppState;

const CLIENT_ID_HEADER: &str = "x-adobesign-clientid";
const CLIENT_ID_HEADER_ALT: &str = "x-adobesign-client-id";

/// Client id to echo: the inbound header when present, else our own.
fn echoed_client_id(headers: &HeaderMap, state: &AppState) -> Option<HeaderValue> {
    headers
        .get(CLIENT_ID_HEADER)
        .or_else(|| headers.get(CLIENT_ID_HEADER_ALT))
        .cloned()
        .or_else(|| HeaderValue::from_str(&state.admin.client_id).ok())
}

fn with_client_id(mut response: Response, headers: &HeaderMap, state: &AppState) -> Response {
    if let Some(value) = echoed_client_id(headers, state) {
        response
            .headers_mut()
            .insert(HeaderName::from_static(CLIENT_ID_HEADER), value);
    }
    response
}

/// HEAD /webhook - URL verification.
pub async fn verify_head(State(state): State<AppState>, headers: HeaderMap) -> Response {
    with_client_id(().into_response(), &headers, &state)
}

/// GET /webhook - URL verification, echoing a non-empty `challenge`.
pub async fn verify_get(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let response = match params.get("challenge").filter(|c| !c.is_empty()) {
        Some(challenge) => challenge.clone().into_response(),
        None => Json(json!({ "status": "pong" })).into_response(),
    };
    with_client_id(response, &headers, &state)
}

/// POST /webhook - Apply one provider event.
pub async fn receive_event(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, AppError> {
    let payload: Value = serde_json::from_slice(&body)
        .map_err(|e| AppError::BadRequest(format!("Invalid webhook payload: {e}")))?;

    let event = WebhookEvent::from_payload(&payload);
    tracing::info!(
        event = %event.kind,
        agreement_id = event.agreement_id.as_deref().unwrap_or("-"),
        participant = event.participant.as_deref().unwrap_or("-"),
        "webhook received"
    );

    match state.webhook_processor.process(&event).await {
        EventOutcome::Ignored(reason) => {
            tracing::debug!(?reason, "webhook event ignored");
        }
        EventOutcome::Processed {
            republish,
            disposition,
            closed,
        } => {
            tracing::info!(?republish, ?disposition, closed, "webhook event processed");
        }
    }

    let response = Json(json!({ "status": "received" })).into_response();
    Ok(with_client_id(response, &headers, &state))
}
