//! E-signature provider REST port.

use signbridge_types::error::UpstreamError;

/// Parameters for creating an agreement from a transient document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgreementRequest {
    pub transient_document_id: String,
    pub name: String,
    /// Signers, all in the same signing round.
    pub signers: Vec<String>,
}

/// Raw provider operations. Every call carries an OAuth bearer token.
pub trait SignatureApi: Send + Sync {
    /// Upload a document and return its one-time transient id.
    fn upload_transient_document(
        &self,
        access_token: &str,
        bytes: Vec<u8>,
        file_name: &str,
    ) -> impl std::future::Future<Output = Result<String, UpstreamError>> + Send;

    /// Create an agreement and return its id.
    fn create_agreement(
        &self,
        access_token: &str,
        request: &AgreementRequest,
    ) -> impl std::future::Future<Output = Result<String, UpstreamError>> + Send;

    /// Fetch the combined signed document with its audit report.
    ///
    /// Returns a 403 status error while the provider is still generating it.
    fn download_combined_document(
        &self,
        access_token: &str,
        agreement_id: &str,
    ) -> impl std::future::Future<Output = Result<Vec<u8>, UpstreamError>> + Send;
}
