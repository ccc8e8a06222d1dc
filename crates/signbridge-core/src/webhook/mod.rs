//! Webhook event handling: the pure agreement state machine and the
//! processor that drives it against the stores and upstream services.

pub mod keyed;
pub mod processor;
pub mod state;
