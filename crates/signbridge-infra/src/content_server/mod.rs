//! OpenText Content Server REST adapter.

pub mod client;
pub mod types;

pub use client::ContentServerClient;

pub(crate) const SERVICE: &str = "otcs";
