//! Token document storage trait.

use signbridge_types::error::RepositoryError;
use signbridge_types::token::OAuthTokenState;

/// Durable storage for the single OAuth token document.
///
/// Uses RPITIT (native async fn in traits, Rust 2024 edition).
/// Implementations live in signbridge-infra.
pub trait TokenRepository: Send + Sync {
    /// Load the persisted token. Returns None when nothing was ever saved.
    fn load(
        &self,
    ) -> impl std::future::Future<Output = Result<Option<OAuthTokenState>, RepositoryError>> + Send;

    /// Replace the persisted token document.
    fn save(
        &self,
        state: &OAuthTokenState,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;
}
