//! Provider OAuth admin flow.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use serde::Deserialize;
use serde_json::Value;

use signbridge_types::error::TokenError;

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

/// GET /admin/login - Redirect to the provider consent page.
pub async fn login(State(state): State<AppState>) -> Redirect {
    Redirect::to(&state.admin.authorize_url)
}

/// GET /admin/callback - Exchange the authorization code for tokens.
pub async fn callback(
    State(state): State<AppState>,
    Query(params): Query<CallbackParams>,
) -> Response {
    if let Some(error) = params.error {
        let description = params.error_description.unwrap_or(error);
        tracing::error!(%description, "provider refused authorization");
        return failure(&description);
    }

    let Some(code) = params.code.filter(|c| !c.is_empty()) else {
        return (StatusCode::BAD_REQUEST, "Missing authorization code.").into_response();
    };

    match state.tokens.complete_authorization(&code).await {
        Ok(()) => Html(
            "<!doctype html><html><body>\
             <h1>Authorization complete</h1>\
             <p>Tokens were stored. You can close this window.</p>\
             </body></html>",
        )
        .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "authorization code exchange failed");
            failure(&describe(&e))
        }
    }
}

fn failure(description: &str) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        format!("Authorization failed: {description}"),
    )
        .into_response()
}

/// The provider's `error_description`, falling back to the error itself.
fn describe(error: &TokenError) -> String {
    let upstream = match error {
        TokenError::AuthorizationFailed(u) | TokenError::RefreshFailed(u) => u,
        other => return other.to_string(),
    };
    serde_json::from_str::<Value>(&upstream.raw_body())
        .ok()
        .and_then(|v| v.get("error_description")?.as_str().map(str::to_string))
        .unwrap_or_else(|| upstream.to_string())
}

#[cfg(test)]
mod tests {
    use signbridge_types::error::UpstreamError;

    use super::*;

    fn failed(body: &str) -> TokenError {
        TokenError::AuthorizationFailed(UpstreamError::Status {
            service: "adobe-sign",
            status: 400,
            body: body.to_string(),
        })
    }

    #[test]
    fn test_describe_prefers_error_description() {
        let e = failed(r#"{"error":"invalid_request","error_description":"code expired"}"#);
        assert_eq!(describe(&e), "code expired");
    }

    #[test]
    fn test_describe_falls_back_to_error() {
        let described = describe(&failed("<html>oops</html>"));
        assert!(described.contains("HTTP 400"));
    }
}
