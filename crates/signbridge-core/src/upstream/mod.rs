//! Upstream API traits (ports) for the two external systems.
//!
//! The core never speaks HTTP; `signbridge-infra` implements these traits
//! with reqwest clients and tests implement them with in-memory fakes.

pub mod content;
pub mod oauth;
pub mod signature;
