//! Business logic services (use cases).
//!
//! Services orchestrate the upstream ports and the durable stores. They
//! depend on traits (ports) -- never on concrete infrastructure
//! implementations.

pub mod agreement;
pub mod provider;
pub mod session;
pub mod signature;
pub mod token;
pub mod workflow;
