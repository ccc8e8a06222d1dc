//! Axum router configuration with middleware.
//!
//! Middleware: CORS (any origin), request tracing and a 10 MiB body limit.

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Build the complete router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Start signature
        .route("/start", post(handlers::agreement::start_signature))
        .route("/agreements", post(handlers::agreement::start_signature))
        // Provider webhook
        .route(
            "/webhook",
            get(handlers::webhook::verify_get)
                .head(handlers::webhook::verify_head)
                .post(handlers::webhook::receive_event),
        )
        // OAuth admin flow
        .route("/admin/login", get(handlers::oauth::login))
        .route("/admin/callback", get(handlers::oauth::callback))
        // Signature issuance
        .route("/auth", get(handlers::signature::issue_signature))
        .route("/health", get(health_check))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /health - Liveness check.
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
