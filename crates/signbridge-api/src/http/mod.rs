//! HTTP surface for signbridge.
//!
//! Axum router with the start-signature endpoint, the provider webhook, the
//! OAuth admin flow and the signature issuance endpoint.

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod response;
pub mod router;
