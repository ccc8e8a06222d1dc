//! Configuration types for signbridge.
//!
//! `BridgeConfig` mirrors the `signbridge.toml` file. Every field has a
//! default so a partial file (or none at all) still yields a usable config;
//! credentials are normally supplied through environment overrides.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use serde::{Deserialize, Deserializer};

use crate::agreement::DEFAULT_DUPLICATE_WINDOW_SECS;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    pub server: ServerConfig,
    pub provider: ProviderConfig,
    pub repository: RepositoryConfig,
    pub security: SecurityConfig,
    pub storage: StorageConfig,
    pub agreements: AgreementConfig,
}

impl BridgeConfig {
    /// OAuth redirect target registered with the provider.
    pub fn redirect_uri(&self) -> String {
        format!("{}/admin/callback", self.server.public_url.trim_end_matches('/'))
    }

    /// Names of required settings that are still empty.
    pub fn missing_required(&self) -> Vec<&'static str> {
        use secrecy::ExposeSecret;

        let mut missing = Vec::new();
        if self.provider.client_id.is_empty() {
            missing.push("provider.client_id");
        }
        if self.provider.client_secret.expose_secret().is_empty() {
            missing.push("provider.client_secret");
        }
        if self.security.signature_secret.expose_secret().is_empty() {
            missing.push("security.signature_secret");
        }
        missing
    }
}

/// HTTP listener settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Externally reachable base URL, used to build the OAuth redirect URI.
    pub public_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            public_url: "http://localhost:3000".to_string(),
        }
    }
}

/// E-signature provider (Adobe Sign) settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub client_id: String,
    #[serde(deserialize_with = "secret_string")]
    pub client_secret: SecretString,
    pub api_base: String,
    pub auth_base: String,
    pub scopes: Vec<String>,
    pub download_max_attempts: u32,
    pub download_retry_delay_ms: u64,
    pub max_download_bytes: u64,
}

impl ProviderConfig {
    pub fn download_retry_delay(&self) -> Duration {
        Duration::from_millis(self.download_retry_delay_ms)
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: SecretString::from(""),
            api_base: "https://api.na4.adobesign.com".to_string(),
            auth_base: "https://secure.na4.adobesign.com".to_string(),
            scopes: [
                "agreement_send:account",
                "agreement_write:account",
                "agreement_read:account",
                "account_read:account",
                "account_write:account",
                "user_login:account",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            download_max_attempts: 50,
            download_retry_delay_ms: 3_000,
            max_download_bytes: 20 * 1024 * 1024,
        }
    }
}

/// Content repository (OTCS) settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RepositoryConfig {
    pub base_url: String,
    pub username: String,
    #[serde(deserialize_with = "secret_string")]
    pub password: SecretString,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/otcs/cs.exe/api".to_string(),
            username: String::new(),
            password: SecretString::from(""),
        }
    }
}

/// Request signing and admin credentials.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    #[serde(deserialize_with = "secret_string")]
    pub signature_secret: SecretString,
    pub admin_user: String,
    #[serde(deserialize_with = "secret_string")]
    pub admin_pass: SecretString,
    pub signature_max_age_secs: i64,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            signature_secret: SecretString::from(""),
            admin_user: String::new(),
            admin_pass: SecretString::from(""),
            signature_max_age_secs: 120,
        }
    }
}

/// Where durable documents and in-process files live.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
    /// Scratch directory for downloaded documents. Defaults to
    /// `{data_dir}/inprocess`.
    pub work_dir: Option<PathBuf>,
}

impl StorageConfig {
    pub fn tokens_path(&self) -> PathBuf {
        self.data_dir.join("tokens.json")
    }

    pub fn agreements_path(&self) -> PathBuf {
        self.data_dir.join("agreements.json")
    }

    pub fn work_dir(&self) -> PathBuf {
        self.work_dir
            .clone()
            .unwrap_or_else(|| self.data_dir.join("inprocess"))
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            work_dir: None,
        }
    }
}

/// Agreement bookkeeping settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AgreementConfig {
    pub duplicate_window_secs: i64,
}

impl Default for AgreementConfig {
    fn default() -> Self {
        Self {
            duplicate_window_secs: DEFAULT_DUPLICATE_WINDOW_SECS,
        }
    }
}

fn secret_string<'de, D>(deserializer: D) -> Result<SecretString, D::Error>
where
    D: Deserializer<'de>,
{
    String::deserialize(deserializer).map(SecretString::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_defaults() {
        let config = BridgeConfig::default();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.provider.download_max_attempts, 50);
        assert_eq!(config.provider.download_retry_delay(), Duration::from_secs(3));
        assert_eq!(config.provider.scopes.len(), 6);
        assert_eq!(config.security.signature_max_age_secs, 120);
        assert_eq!(config.agreements.duplicate_window_secs, 900);
        assert_eq!(config.storage.work_dir(), PathBuf::from("data/inprocess"));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: BridgeConfig = toml::from_str(
            r#"
[server]
port = 8443
public_url = "https://bridge.example.com/"

[provider]
client_id = "abc"
client_secret = "shh"
"#,
        )
        .unwrap();
        assert_eq!(config.server.port, 8443);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.provider.client_secret.expose_secret(), "shh");
        assert_eq!(config.provider.api_base, "https://api.na4.adobesign.com");
        assert_eq!(
            config.redirect_uri(),
            "https://bridge.example.com/admin/callback"
        );
    }

    #[test]
    fn test_missing_required() {
        let config = BridgeConfig::default();
        assert_eq!(
            config.missing_required(),
            vec![
                "provider.client_id",
                "provider.client_secret",
                "security.signature_secret"
            ]
        );
    }
}
