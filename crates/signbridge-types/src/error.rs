use thiserror::Error;

/// Errors from the OAuth token lifecycle.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("no refresh token cached; re-authentication required")]
    RefreshTokenMissing,

    #[error("token refresh failed: {0}")]
    RefreshFailed(#[source] UpstreamError),

    #[error("authorization code exchange failed: {0}")]
    AuthorizationFailed(#[source] UpstreamError),

    #[error("token storage error: {0}")]
    Storage(#[from] RepositoryError),
}

/// A failed call to either external API.
#[derive(Debug, Clone, Error)]
pub enum UpstreamError {
    #[error("{service} returned HTTP {status}: {body}")]
    Status {
        service: &'static str,
        status: u16,
        body: String,
    },

    #[error("{service} request failed: {message}")]
    Transport {
        service: &'static str,
        message: String,
    },

    #[error("{service} sent an unexpected response: {message}")]
    Decode {
        service: &'static str,
        message: String,
    },
}

impl UpstreamError {
    pub fn status(&self) -> Option<u16> {
        match self {
            UpstreamError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// 403 from the combined-document endpoint while the provider is still
    /// generating the signed file.
    pub fn is_generation_pending(&self) -> bool {
        self.status() == Some(403)
    }

    /// The upstream response body, or the error message when there was none.
    pub fn raw_body(&self) -> String {
        match self {
            UpstreamError::Status { body, .. } => body.clone(),
            UpstreamError::Transport { message, .. } | UpstreamError::Decode { message, .. } => {
                message.clone()
            }
        }
    }
}

/// Errors from repository operations (used by trait definitions in signbridge-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("io error: {0}")]
    Io(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("conflict: {0}")]
    Conflict(String),
}

/// A provider call failed before or after reaching the provider.
#[derive(Debug, Error)]
pub enum ProviderCallError {
    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

/// Failures of the start-signature flow, one variant per HTTP outcome.
#[derive(Debug, Error)]
pub enum StartError {
    #[error("{0}")]
    Validation(String),

    #[error("document was already sent to these recipients recently")]
    Duplicate,

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    #[error("agreement bookkeeping failed: {0}")]
    Storage(#[from] RepositoryError),
}

impl From<ProviderCallError> for StartError {
    fn from(e: ProviderCallError) -> Self {
        match e {
            ProviderCallError::Token(t) => StartError::Token(t),
            ProviderCallError::Upstream(u) => StartError::Upstream(u),
        }
    }
}
