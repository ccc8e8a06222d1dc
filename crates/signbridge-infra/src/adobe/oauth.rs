//! Adobe Sign OAuth 2.0 grants and the consent URL.
//!
//! The client secret is wrapped in [`SecretString`] and only exposed when
//! building a token request body.

use secrecy::{ExposeSecret, SecretString};

use signbridge_core::upstream::oauth::OAuthGrant;
use signbridge_types::config::BridgeConfig;
use signbridge_types::error::UpstreamError;
use signbridge_types::token::TokenGrant;

use super::SERVICE;
use crate::http::{read_json, transport};

pub struct AdobeOAuthClient {
    client: reqwest::Client,
    api_base: String,
    auth_base: String,
    client_id: String,
    client_secret: SecretString,
    redirect_uri: String,
    scopes: Vec<String>,
}

impl AdobeOAuthClient {
    pub fn new(client: reqwest::Client, config: &BridgeConfig) -> Self {
        let provider = &config.provider;
        Self {
            client,
            api_base: provider.api_base.trim_end_matches('/').to_string(),
            auth_base: provider.auth_base.trim_end_matches('/').to_string(),
            client_id: provider.client_id.clone(),
            client_secret: SecretString::from(provider.client_secret.expose_secret().to_string()),
            redirect_uri: config.redirect_uri(),
            scopes: provider.scopes.clone(),
        }
    }

    /// Consent page the administrator is redirected to.
    pub fn authorize_url(&self) -> anyhow::Result<String> {
        let scope = self.scopes.join(" ");
        let url = reqwest::Url::parse_with_params(
            &format!("{}/public/oauth/v2", self.auth_base),
            &[
                ("response_type", "code"),
                ("client_id", self.client_id.as_str()),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("scope", scope.as_str()),
            ],
        )?;
        Ok(url.to_string())
    }

    async fn token_request(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<TokenGrant, UpstreamError> {
        let response = self
            .client
            .post(format!("{}{}", self.api_base, path))
            .form(params)
            .send()
            .await
            .map_err(|e| transport(SERVICE, e))?;
        read_json(SERVICE, response).await
    }
}

impl OAuthGrant for AdobeOAuthClient {
    async fn refresh(&self, refresh_token: &str) -> Result<TokenGrant, UpstreamError> {
        self.token_request(
            "/oauth/v2/refresh",
            &[
                ("grant_type", "refresh_token"),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.expose_secret()),
                ("refresh_token", refresh_token),
            ],
        )
        .await
    }

    async fn exchange_code(&self, code: &str) -> Result<TokenGrant, UpstreamError> {
        self.token_request(
            "/oauth/v2/token",
            &[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.expose_secret()),
                ("redirect_uri", self.redirect_uri.as_str()),
            ],
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authorize_url() {
        let mut config = BridgeConfig::default();
        config.provider.client_id = "CBJ CK".to_string();
        config.provider.scopes = vec!["agreement_send:account".into(), "user_login:account".into()];
        config.server.public_url = "https://bridge.example.com".to_string();

        let url = AdobeOAuthClient::new(reqwest::Client::new(), &config)
            .authorize_url()
            .unwrap();

        assert!(
            url.starts_with("https://secure.na4.adobesign.com/public/oauth/v2?response_type=code")
        );
        assert!(url.contains("client_id=CBJ+CK"));
        assert!(url.contains("redirect_uri=https%3A%2F%2Fbridge.example.com%2Fadmin%2Fcallback"));
        assert!(url.contains("scope=agreement_send%3Aaccount+user_login%3Aaccount"));
    }
}
