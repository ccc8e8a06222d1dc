//! Shared domain types for signbridge.
//!
//! Token state, agreement records, provider webhook events, configuration and
//! the error enums shared by the core and infrastructure layers.
//!
//! Zero infrastructure dependencies -- only serde, chrono, thiserror, secrecy.

pub mod agreement;
pub mod config;
pub mod error;
pub mod event;
pub mod request;
pub mod token;
