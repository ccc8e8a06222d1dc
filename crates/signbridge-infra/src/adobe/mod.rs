//! Adobe Sign adapters: the REST v6 client and the OAuth grant client.

pub mod client;
pub mod oauth;
pub mod types;

pub use client::AdobeSignClient;
pub use oauth::AdobeOAuthClient;

pub(crate) const SERVICE: &str = "adobe-sign";
