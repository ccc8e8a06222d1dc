//! Whole-document JSON files for the token and agreement stores.
//!
//! Each mutation rewrites the full document: serialize, write to a sibling
//! temp file, then rename over the target so readers never see a torn file.

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use signbridge_core::repository::agreement::{AgreementBackend, AgreementMap};
use signbridge_core::repository::token::TokenRepository;
use signbridge_types::error::RepositoryError;
use signbridge_types::token::OAuthTokenState;

/// Read and parse `path`. A missing file is `Ok(None)`.
async fn read_document<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, RepositoryError> {
    let raw = match tokio::fs::read_to_string(path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(RepositoryError::Io(format!(
                "failed to read {}: {e}",
                path.display()
            )));
        }
    };
    if raw.trim().is_empty() {
        return Ok(None);
    }
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|e| RepositoryError::Serialization(format!("{}: {e}", path.display())))
}

async fn write_document<T: Serialize>(path: &Path, document: &T) -> Result<(), RepositoryError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(|e| {
            RepositoryError::Io(format!("failed to create {}: {e}", parent.display()))
        })?;
    }

    let payload = serde_json::to_vec_pretty(document)
        .map_err(|e| RepositoryError::Serialization(e.to_string()))?;

    let temp_path = path.with_extension(format!("{}.tmp", Uuid::now_v7().simple()));
    tokio::fs::write(&temp_path, payload)
        .await
        .map_err(|e| RepositoryError::Io(format!("failed to write {}: {e}", temp_path.display())))?;

    if let Err(e) = tokio::fs::rename(&temp_path, path).await {
        let _ = tokio::fs::remove_file(&temp_path).await;
        return Err(RepositoryError::Io(format!(
            "failed to replace {}: {e}",
            path.display()
        )));
    }
    Ok(())
}

/// `tokens.json` in the data directory.
pub struct JsonFileTokenRepository {
    path: PathBuf,
}

impl JsonFileTokenRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenRepository for JsonFileTokenRepository {
    async fn load(&self) -> Result<Option<OAuthTokenState>, RepositoryError> {
        read_document(&self.path).await
    }

    async fn save(&self, state: &OAuthTokenState) -> Result<(), RepositoryError> {
        write_document(&self.path, state).await
    }
}

/// `agreements.json` in the data directory.
pub struct JsonFileAgreementBackend {
    path: PathBuf,
}

impl JsonFileAgreementBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl AgreementBackend for JsonFileAgreementBackend {
    async fn load(&self) -> Result<AgreementMap, RepositoryError> {
        Ok(read_document(&self.path).await?.unwrap_or_default())
    }

    async fn flush(&self, records: &AgreementMap) -> Result<(), RepositoryError> {
        write_document(&self.path, records).await
    }
}
