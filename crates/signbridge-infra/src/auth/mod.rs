//! Request authentication: HMAC-signed timestamps and admin credentials.

pub mod request_signature;

pub use request_signature::{AuthError, IssuedSignature, RequestSigner, credentials_match};
