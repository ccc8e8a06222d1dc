//! Infrastructure layer for signbridge.
//!
//! Contains implementations of the port traits defined in `signbridge-core`:
//! JSON-file storage for tokens and agreements, reqwest clients for the
//! e-signature provider and the content repository, request signing, and the
//! configuration loader.

pub mod adobe;
pub mod auth;
pub mod config;
pub mod content_server;
pub mod storage;

mod http;

/// Build the shared HTTP client used by both upstream adapters.
pub fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(120))
        .build()
        .expect("failed to create reqwest client")
}
