//! OAuth token lifecycle for the e-signature provider.
//!
//! One `TokenManager` owns the process-wide token state. Reads, refreshes and
//! writes all go through a single async mutex, so callers that hit an expired
//! token at the same moment share one refresh grant.

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use signbridge_types::error::{TokenError, UpstreamError};
use signbridge_types::token::{OAuthTokenState, expiry_after};

use crate::repository::token::TokenRepository;
use crate::upstream::oauth::OAuthGrant;

/// Anything that can hand out a bearer token for the provider API.
pub trait AccessTokenSource: Send + Sync {
    fn access_token(
        &self,
    ) -> impl std::future::Future<Output = Result<String, TokenError>> + Send;
}

/// Owns the cached token and the refresh policy.
pub struct TokenManager<R: TokenRepository, G: OAuthGrant> {
    state: Mutex<OAuthTokenState>,
    repo: R,
    grant: G,
}

impl<R: TokenRepository, G: OAuthGrant> TokenManager<R, G> {
    /// Build a manager with an empty token state.
    pub fn new(repo: R, grant: G) -> Self {
        Self {
            state: Mutex::new(OAuthTokenState::default()),
            repo,
            grant,
        }
    }

    /// Build a manager from the persisted token document.
    ///
    /// A missing or unreadable document yields an empty state; the first
    /// `ensure_token` then fails until an administrator re-authorizes.
    pub async fn load(repo: R, grant: G) -> Self {
        let state = match repo.load().await {
            Ok(Some(state)) => {
                tracing::info!(expires_at = %state.expires_at, "loaded cached provider token");
                state
            }
            Ok(None) => {
                tracing::info!("no cached provider token, authorization required");
                OAuthTokenState::default()
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to load provider token, starting empty");
                OAuthTokenState::default()
            }
        };
        Self {
            state: Mutex::new(state),
            repo,
            grant,
        }
    }

    /// Return a usable access token, refreshing it when absent or about to
    /// expire.
    pub async fn ensure_token(&self) -> Result<String, TokenError> {
        let mut state = self.state.lock().await;
        if state.is_fresh_at(Utc::now()) {
            return Ok(state.access_token.clone());
        }
        if !state.has_refresh_token() {
            tracing::warn!("provider token expired and no refresh token is cached");
            return Err(TokenError::RefreshTokenMissing);
        }

        tracing::info!("refreshing provider access token");
        let grant = self
            .grant
            .refresh(&state.refresh_token)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "provider token refresh failed");
                TokenError::RefreshFailed(e)
            })?;

        let expires_at = grant_expiry(grant.expires_in).map_err(TokenError::RefreshFailed)?;
        self.store(&mut state, grant.access_token, expires_at, grant.refresh_token)
            .await?;
        Ok(state.access_token.clone())
    }

    /// Exchange an authorization code from the admin login redirect.
    pub async fn complete_authorization(&self, code: &str) -> Result<(), TokenError> {
        let grant = self
            .grant
            .exchange_code(code)
            .await
            .map_err(TokenError::AuthorizationFailed)?;
        self.set_token(grant.access_token, grant.expires_in, grant.refresh_token)
            .await?;
        tracing::info!("provider authorization completed");
        Ok(())
    }

    /// Replace the cached token and persist it.
    ///
    /// A lifetime that does not fit a timestamp is rejected as
    /// `AuthorizationFailed` and leaves the cache untouched.
    pub async fn set_token(
        &self,
        access_token: String,
        ttl_secs: i64,
        refresh_token: Option<String>,
    ) -> Result<(), TokenError> {
        let expires_at = grant_expiry(ttl_secs).map_err(TokenError::AuthorizationFailed)?;
        let mut state = self.state.lock().await;
        self.store(&mut state, access_token, expires_at, refresh_token)
            .await
    }

    /// True when a token can be produced without human interaction.
    pub async fn is_authorized(&self) -> bool {
        let state = self.state.lock().await;
        state.is_fresh_at(Utc::now()) || state.has_refresh_token()
    }

    // Memory is updated first so a rotated refresh token survives a failed write.
    async fn store(
        &self,
        state: &mut OAuthTokenState,
        access_token: String,
        expires_at: DateTime<Utc>,
        refresh_token: Option<String>,
    ) -> Result<(), TokenError> {
        state.apply(access_token, expires_at, refresh_token);
        self.repo.save(state).await.map_err(|e| {
            tracing::error!(error = %e, "failed to persist provider token");
            TokenError::Storage(e)
        })
    }
}

/// Absolute expiry for a granted `expires_in`.
fn grant_expiry(expires_in: i64) -> Result<DateTime<Utc>, UpstreamError> {
    expiry_after(Utc::now(), expires_in).ok_or_else(|| UpstreamError::Decode {
        service: "adobe-sign",
        message: format!("token lifetime of {expires_in}s is out of range"),
    })
}

impl<R: TokenRepository, G: OAuthGrant> AccessTokenSource for TokenManager<R, G> {
    async fn access_token(&self) -> Result<String, TokenError> {
        self.ensure_token().await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use chrono::Duration as ChronoDuration;

    use super::*;
    use crate::repository::memory::InMemoryTokenRepository;
    use crate::test_support::{FakeGrant, status_error};

    fn cached(expires_in_secs: i64, refresh: &str) -> OAuthTokenState {
        OAuthTokenState {
            access_token: "cached".to_string(),
            refresh_token: refresh.to_string(),
            expires_at: Utc::now() + ChronoDuration::seconds(expires_in_secs),
        }
    }

    #[tokio::test]
    async fn test_fresh_token_is_not_refreshed() {
        let manager = TokenManager::load(
            InMemoryTokenRepository::with_state(cached(600, "r")),
            FakeGrant::ok("new", 3600, None),
        )
        .await;

        assert_eq!(manager.ensure_token().await.unwrap(), "cached");
        assert_eq!(manager.grant.refreshes(), 0);
    }

    #[tokio::test]
    async fn test_token_inside_buffer_is_refreshed() {
        let manager = TokenManager::load(
            InMemoryTokenRepository::with_state(cached(20, "r")),
            FakeGrant::ok("new", 3600, None),
        )
        .await;

        assert_eq!(manager.ensure_token().await.unwrap(), "new");
        assert_eq!(manager.grant.refreshes(), 1);

        // Refresh without a rotated refresh token keeps the cached one.
        let stored = manager.repo.stored().unwrap();
        assert_eq!(stored.access_token, "new");
        assert_eq!(stored.refresh_token, "r");
    }

    #[tokio::test]
    async fn test_absent_token_without_refresh_token_fails() {
        let manager = TokenManager::load(
            InMemoryTokenRepository::new(),
            FakeGrant::ok("new", 3600, None),
        )
        .await;

        assert!(matches!(
            manager.ensure_token().await,
            Err(TokenError::RefreshTokenMissing)
        ));
        assert!(!manager.is_authorized().await);
    }

    #[tokio::test]
    async fn test_refresh_failure_is_wrapped() {
        let manager = TokenManager::load(
            InMemoryTokenRepository::with_state(cached(-10, "r")),
            FakeGrant::failing(status_error("adobe-sign", 400, "invalid_grant")),
        )
        .await;

        match manager.ensure_token().await {
            Err(TokenError::RefreshFailed(e)) => assert_eq!(e.status(), Some(400)),
            other => panic!("expected RefreshFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_out_of_range_lifetime_is_a_decode_error() {
        let manager = TokenManager::load(
            InMemoryTokenRepository::with_state(cached(-10, "r")),
            FakeGrant::ok("new", i64::MAX, None),
        )
        .await;

        match manager.ensure_token().await {
            Err(TokenError::RefreshFailed(UpstreamError::Decode { .. })) => {}
            other => panic!("expected decode failure, got {other:?}"),
        }
        assert_eq!(manager.repo.save_count(), 0);
        assert_eq!(manager.state.lock().await.access_token, "cached");
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_one_refresh() {
        let manager = Arc::new(
            TokenManager::load(
                InMemoryTokenRepository::with_state(cached(-10, "r")),
                FakeGrant::ok("new", 3600, Some("r2")).with_latency(Duration::from_millis(50)),
            )
            .await,
        );

        let mut handles = Vec::new();
        for _ in 0..8 {
            let m = manager.clone();
            handles.push(tokio::spawn(async move { m.ensure_token().await }));
        }
        for h in handles {
            assert_eq!(h.await.unwrap().unwrap(), "new");
        }

        assert_eq!(manager.grant.refreshes(), 1);
        assert_eq!(manager.repo.save_count(), 1);
        assert_eq!(manager.repo.stored().unwrap().refresh_token, "r2");
    }

    #[tokio::test]
    async fn test_complete_authorization_persists_tokens() {
        let manager = TokenManager::new(
            InMemoryTokenRepository::new(),
            FakeGrant::ok("granted", 3600, Some("refresh-1")),
        );

        manager.complete_authorization("code-123").await.unwrap();

        assert!(manager.is_authorized().await);
        assert_eq!(manager.ensure_token().await.unwrap(), "granted");
        assert_eq!(manager.repo.stored().unwrap().refresh_token, "refresh-1");
    }

    #[tokio::test]
    async fn test_failed_exchange_reports_authorization_error() {
        let manager = TokenManager::new(
            InMemoryTokenRepository::new(),
            FakeGrant::failing(status_error("adobe-sign", 400, "bad code")),
        );

        assert!(matches!(
            manager.complete_authorization("x").await,
            Err(TokenError::AuthorizationFailed(_))
        ));
        assert_eq!(manager.repo.save_count(), 0);
    }

    #[tokio::test]
    async fn test_set_token_keeps_refresh_token_when_none_given() {
        let manager = TokenManager::load(
            InMemoryTokenRepository::with_state(cached(-10, "r")),
            FakeGrant::ok("unused", 3600, None),
        )
        .await;

        manager.set_token("manual".to_string(), 3600, None).await.unwrap();

        assert_eq!(manager.ensure_token().await.unwrap(), "manual");
        assert_eq!(manager.grant.refreshes(), 0);
        assert_eq!(manager.repo.stored().unwrap().refresh_token, "r");
    }

    #[tokio::test]
    async fn test_set_token_rejects_out_of_range_lifetime() {
        let manager = TokenManager::load(
            InMemoryTokenRepository::with_state(cached(3600, "r")),
            FakeGrant::ok("unused", 3600, None),
        )
        .await;

        assert!(matches!(
            manager.set_token("manual".to_string(), i64::MIN, None).await,
            Err(TokenError::AuthorizationFailed(UpstreamError::Decode { .. }))
        ));
        assert_eq!(manager.repo.save_count(), 0);
        assert_eq!(manager.ensure_token().await.unwrap(), "cached");
    }
}
