//! Application error type mapping to HTTP status codes and the envelope format.

use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde_json::Value;

use signbridge_infra::auth::AuthError;
use signbridge_types::error::{StartError, TokenError, UpstreamError};

use crate::http::response::ApiResponse;

pub const BASIC_REALM: &str = "Basic realm=\"signbridge\"";

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    Start(StartError),
    /// Request signature rejected.
    Auth(AuthError),
    /// Admin credentials missing or wrong.
    Unauthorized(String),
    /// Body could not be read as the expected JSON.
    BadRequest(String),
    Internal(String),
}

impl From<StartError> for AppError {
    fn from(e: StartError) -> Self {
        AppError::Start(e)
    }
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        AppError::Auth(e)
    }
}

impl AppError {
    fn parts(&self) -> (StatusCode, &'static str, String, Option<Value>) {
        match self {
            AppError::Start(StartError::Validation(msg)) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone(), None)
            }
            AppError::Start(StartError::Duplicate) => (
                StatusCode::CONFLICT,
                "DUPLICATE_REQUEST",
                "Duplicate request: this document was already sent to these recipients.".to_string(),
                None,
            ),
            AppError::Start(StartError::Token(e)) => {
                let details = match e {
                    TokenError::RefreshFailed(u) => Some(raw_details(u)),
                    _ => None,
                };
                (
                    StatusCode::UNAUTHORIZED,
                    "LOGIN_REQUIRED",
                    "Provider authorization required. An administrator must visit /admin/login."
                        .to_string(),
                    details,
                )
            }
            AppError::Start(StartError::Upstream(e)) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "UPSTREAM_ERROR",
                e.to_string(),
                Some(raw_details(e)),
            ),
            AppError::Start(StartError::Storage(e)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR", e.to_string(), None)
            }
            AppError::Auth(e) => {
                let code = match e {
                    AuthError::Missing => "MISSING_SIGNATURE",
                    AuthError::Malformed => "MALFORMED_SIGNATURE",
                    AuthError::Expired => "TIMESTAMP_EXPIRED",
                    AuthError::Invalid => "INVALID_SIGNATURE",
                };
                let status = StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::FORBIDDEN);
                (status, code, e.to_string(), None)
            }
            AppError::Unauthorized(msg) => {
                (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone(), None)
            }
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone(), None)
            }
            AppError::Internal(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg.clone(), None)
            }
        }
    }
}

/// Upstream body as JSON when it parses, else as a string.
fn raw_details(e: &UpstreamError) -> Value {
    let raw = e.raw_body();
    serde_json::from_str(&raw).unwrap_or(Value::String(raw))
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = self.parts();
        if status.is_server_error() {
            tracing::error!(code, %message, "request failed");
        } else {
            tracing::warn!(code, %message, "request rejected");
        }

        let mut response = ApiResponse::error(code, &message, details).into_response();
        *response.status_mut() = status;
        if matches!(self, AppError::Unauthorized(_)) {
            response.headers_mut().insert(
                header::WWW_AUTHENTICATE,
                header::HeaderValue::from_static(BASIC_REALM),
            );
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(e: AppError) -> StatusCode {
        e.into_response().status()
    }

    #[test]
    fn test_start_error_statuses() {
        assert_eq!(
            status_of(StartError::Validation("attachId is mandatory.".into()).into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(status_of(StartError::Duplicate.into()), StatusCode::CONFLICT);
        assert_eq!(
            status_of(StartError::Token(TokenError::RefreshTokenMissing).into()),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn test_auth_error_statuses() {
        assert_eq!(status_of(AuthError::Missing.into()), StatusCode::UNAUTHORIZED);
        assert_eq!(status_of(AuthError::Malformed.into()), StatusCode::BAD_REQUEST);
        assert_eq!(status_of(AuthError::Expired.into()), StatusCode::FORBIDDEN);
        assert_eq!(status_of(AuthError::Invalid.into()), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_upstream_body_is_embedded_as_json() {
        let err = AppError::Start(StartError::Upstream(UpstreamError::Status {
            service: "adobe-sign",
            status: 400,
            body: "{\"code\":\"INVALID_PARTICIPANT\"}".into(),
        }));
        let (status, code, _, details) = err.parts();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(code, "UPSTREAM_ERROR");
        assert_eq!(details.unwrap()["code"], "INVALID_PARTICIPANT");
    }

    #[test]
    fn test_non_json_upstream_body_kept_as_string() {
        let err = UpstreamError::Status {
            service: "otcs",
            status: 502,
            body: "Bad Gateway".into(),
        };
        assert_eq!(raw_details(&err), Value::String("Bad Gateway".into()));
    }

    #[test]
    fn test_unauthorized_carries_challenge() {
        let response = AppError::Unauthorized("Authentication required.".into()).into_response();
        assert_eq!(response.headers()[header::WWW_AUTHENTICATE], BASIC_REALM);
    }
}
