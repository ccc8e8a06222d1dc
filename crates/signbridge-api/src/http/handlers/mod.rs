//! HTTP request handlers.

pub mod agreement;
pub mod oauth;
pub mod signature;
pub mod webhook;
