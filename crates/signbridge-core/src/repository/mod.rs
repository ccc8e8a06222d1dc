//! Repository trait definitions (ports).
//!
//! Both durable documents are small and rewritten whole on every mutation,
//! so the traits expose load/flush of the full document rather than per-key
//! operations.

pub mod agreement;
pub mod memory;
pub mod token;
