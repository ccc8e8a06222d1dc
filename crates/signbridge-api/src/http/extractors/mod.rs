//! Custom axum extractors.

pub mod basic_auth;
