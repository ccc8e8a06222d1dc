//! OAuth grant port for the e-signature provider.

use signbridge_types::error::UpstreamError;
use signbridge_types::token::TokenGrant;

/// The two token-endpoint grants the bridge uses.
pub trait OAuthGrant: Send + Sync {
    /// Exchange a refresh token for a new access token.
    fn refresh(
        &self,
        refresh_token: &str,
    ) -> impl std::future::Future<Output = Result<TokenGrant, UpstreamError>> + Send;

    /// Exchange an authorization code from the login redirect.
    fn exchange_code(
        &self,
        code: &str,
    ) -> impl std::future::Future<Output = Result<TokenGrant, UpstreamError>> + Send;
}
