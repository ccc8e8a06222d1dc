//! E-signature provider operations with token handling and the signed
//! document retry loop.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use signbridge_types::error::{ProviderCallError, TokenError};

use crate::retry::{RetryOutcome, RetryPolicy, retry_when};
use crate::service::token::AccessTokenSource;
use crate::upstream::signature::{AgreementRequest, SignatureApi};

pub struct SignatureProviderClient<A: SignatureApi, T: AccessTokenSource> {
    api: A,
    tokens: Arc<T>,
    retry: RetryPolicy,
    work_dir: PathBuf,
}

impl<A: SignatureApi, T: AccessTokenSource> SignatureProviderClient<A, T> {
    /// - `retry`: attempts and delay for the combined-document download
    /// - `work_dir`: where signed documents are written
    pub fn new(api: A, tokens: Arc<T>, retry: RetryPolicy, work_dir: PathBuf) -> Self {
        Self {
            api,
            tokens,
            retry,
            work_dir,
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub async fn ensure_token(&self) -> Result<String, TokenError> {
        self.tokens.access_token().await
    }

    /// Upload a document for one-time use by `create_agreement`.
    pub async fn upload_transient_document(
        &self,
        bytes: Vec<u8>,
        file_name: &str,
    ) -> Result<String, ProviderCallError> {
        let token = self.ensure_token().await?;
        let id = self
            .api
            .upload_transient_document(&token, bytes, file_name)
            .await?;
        tracing::debug!(file_name, "transient document uploaded");
        Ok(id)
    }

    /// Create an agreement with every recipient signing in the same round.
    pub async fn create_agreement(
        &self,
        transient_document_id: &str,
        name: &str,
        emails: &[String],
    ) -> Result<String, ProviderCallError> {
        let token = self.ensure_token().await?;
        let request = AgreementRequest {
            transient_document_id: transient_document_id.to_string(),
            name: name.to_string(),
            signers: emails.to_vec(),
        };
        Ok(self.api.create_agreement(&token, &request).await?)
    }

    /// Fetch the signed document into `work_dir/<agreement_id>/<file_name>`.
    ///
    /// The provider answers 403 for a while after the signing event; those
    /// answers are retried on the configured policy. Any other failure, or
    /// running out of attempts, is logged and yields `None`.
    pub async fn download_signed_document_with_retry(
        &self,
        agreement_id: &str,
        file_name: &str,
    ) -> Option<PathBuf> {
        let outcome = retry_when(
            self.retry,
            move |_| async move {
                let token = self.ensure_token().await?;
                let bytes = self
                    .api
                    .download_combined_document(&token, agreement_id)
                    .await?;
                Ok::<_, ProviderCallError>(bytes)
            },
            |e| matches!(e, ProviderCallError::Upstream(u) if u.is_generation_pending()),
        )
        .await;

        let bytes = match outcome {
            RetryOutcome::Succeeded { value, attempts } => {
                tracing::info!(agreement_id, attempts, "signed document downloaded");
                value
            }
            RetryOutcome::Exhausted { attempts, last_error } => {
                tracing::error!(
                    agreement_id,
                    attempts,
                    error = %last_error,
                    "signed document still unavailable, giving up"
                );
                return None;
            }
            RetryOutcome::Aborted { attempts, error } => {
                tracing::error!(
                    agreement_id,
                    attempts,
                    error = %error,
                    "signed document download failed"
                );
                return None;
            }
        };

        match self.write_document(agreement_id, file_name, &bytes).await {
            Ok(path) => Some(path),
            Err(e) => {
                tracing::error!(agreement_id, error = %e, "failed to write signed document");
                None
            }
        }
    }

    async fn write_document(
        &self,
        agreement_id: &str,
        file_name: &str,
        bytes: &[u8],
    ) -> std::io::Result<PathBuf> {
        // Documents of different agreements may share a name.
        let dir = self.work_dir.join(final_component(agreement_id, "agreement"));
        tokio::fs::create_dir_all(&dir).await?;
        let path = dir.join(final_component(file_name, "document.pdf"));
        tokio::fs::write(&path, bytes).await?;
        Ok(path)
    }
}

/// Last path component of a caller-supplied name, so it cannot leave the
/// work directory.
fn final_component(name: &str, fallback: &str) -> OsString {
    Path::new(name)
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| fallback.into())
}
