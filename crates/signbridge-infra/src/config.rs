//! Configuration loader for signbridge.
//!
//! Reads `signbridge.toml` into [`BridgeConfig`], then lets environment
//! variables override individual settings. Credentials normally arrive
//! through the environment.

use std::path::{Path, PathBuf};

use anyhow::Context;
use secrecy::SecretString;

use signbridge_types::config::BridgeConfig;

/// Load configuration from `path` and apply environment overrides.
///
/// - A missing file yields [`BridgeConfig::default()`].
/// - A file that exists but fails to parse is an error.
pub async fn load_config(path: &Path) -> anyhow::Result<BridgeConfig> {
    let config = match tokio::fs::read_to_string(path).await {
        Ok(content) => toml::from_str::<BridgeConfig>(&content)
            .with_context(|| format!("failed to parse {}", path.display()))?,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config file at {}, using defaults", path.display());
            BridgeConfig::default()
        }
        Err(err) => {
            return Err(err).with_context(|| format!("failed to read {}", path.display()));
        }
    };

    let config = apply_env_overrides(config);
    let missing = config.missing_required();
    if !missing.is_empty() {
        tracing::warn!(missing = ?missing, "required settings are not configured");
    }
    Ok(config)
}

/// Apply overrides from the process environment.
pub fn apply_env_overrides(config: BridgeConfig) -> BridgeConfig {
    apply_env_overrides_from(config, |key| std::env::var(key).ok())
}

/// Apply overrides from `lookup`. Empty values are ignored.
pub fn apply_env_overrides_from<F>(mut config: BridgeConfig, lookup: F) -> BridgeConfig
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(port) = get("PORT") {
        match port.trim().parse() {
            Ok(port) => config.server.port = port,
            Err(_) => tracing::warn!(value = %port, "ignoring invalid PORT"),
        }
    }
    if let Some(url) = get("PUBLIC_URL") {
        config.server.public_url = url;
    }
    if let Some(id) = get("CLIENT_ID") {
        config.provider.client_id = id;
    }
    if let Some(secret) = get("CLIENT_SECRET") {
        config.provider.client_secret = SecretString::from(secret);
    }
    if let Some(base) = get("OTCS_BASE") {
        config.repository.base_url = base;
    }
    if let Some(user) = get("OTCS_USER") {
        config.repository.username = user;
    }
    if let Some(pass) = get("OTCS_PASS") {
        config.repository.password = SecretString::from(pass);
    }
    if let Some(secret) = get("SIGNATURE_SECRET") {
        config.security.signature_secret = SecretString::from(secret);
    }
    if let Some(user) = get("LOG_USER") {
        config.security.admin_user = user;
    }
    if let Some(pass) = get("LOG_PASS") {
        config.security.admin_pass = SecretString::from(pass);
    }
    if let Some(dir) = get("SIGNBRIDGE_DATA_DIR") {
        config.storage.data_dir = PathBuf::from(dir);
    }
    config
}
