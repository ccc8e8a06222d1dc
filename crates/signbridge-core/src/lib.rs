//! Orchestration logic and port traits for signbridge.
//!
//! This crate defines the "ports" (storage and upstream API traits) that the
//! infrastructure layer implements, and every piece of business logic that
//! binds them: token lifecycle, repository session, agreement bookkeeping,
//! the signed-document retry loop and the webhook state machine. It depends
//! only on `signbridge-types` -- never on `signbridge-infra`, HTTP clients or
//! a specific storage format.

pub mod repository;
pub mod retry;
pub mod service;
pub mod upstream;
pub mod validation;
pub mod webhook;

#[cfg(test)]
pub(crate) mod test_support;
