//! AdobeSignClient -- concrete [`SignatureApi`] implementation for the
//! Adobe Sign REST v6 API.

use reqwest::multipart::{Form, Part};

use signbridge_core::upstream::signature::{AgreementRequest, SignatureApi};
use signbridge_types::config::ProviderConfig;
use signbridge_types::error::UpstreamError;

use super::SERVICE;
use super::types::{AgreementCreationInfo, AgreementCreationResponse, TransientDocumentResponse};
use crate::http::{decode, read_bytes_capped, read_json, transport};

pub struct AdobeSignClient {
    client: reqwest::Client,
    api_base: String,
    max_download_bytes: u64,
}

impl AdobeSignClient {
    pub fn new(client: reqwest::Client, config: &ProviderConfig) -> Self {
        Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            max_download_bytes: config.max_download_bytes,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/rest/v6{}", self.api_base, path)
    }
}

impl SignatureApi for AdobeSignClient {
    async fn upload_transient_document(
        &self,
        access_token: &str,
        bytes: Vec<u8>,
        file_name: &str,
    ) -> Result<String, UpstreamError> {
        let part = Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str("application/pdf")
            .map_err(|e| decode(SERVICE, e.to_string()))?;
        let form = Form::new().part("File", part);

        let response = self
            .client
            .post(self.url("/transientDocuments"))
            .bearer_auth(access_token)
            .multipart(form)
            .send()
            .await
            .map_err(|e| transport(SERVICE, e))?;

        let body: TransientDocumentResponse = read_json(SERVICE, response).await?;
        Ok(body.transient_document_id)
    }

    async fn create_agreement(
        &self,
        access_token: &str,
        request: &AgreementRequest,
    ) -> Result<String, UpstreamError> {
        let response = self
            .client
            .post(self.url("/agreements"))
            .bearer_auth(access_token)
            .json(&AgreementCreationInfo::from(request))
            .send()
            .await
            .map_err(|e| transport(SERVICE, e))?;

        let body: AgreementCreationResponse = read_json(SERVICE, response).await?;
        Ok(body.id)
    }

    async fn download_combined_document(
        &self,
        access_token: &str,
        agreement_id: &str,
    ) -> Result<Vec<u8>, UpstreamError> {
        let response = self
            .client
            .get(self.url(&format!("/agreements/{agreement_id}/combinedDocument")))
            .query(&[("attachAuditReport", "true")])
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| transport(SERVICE, e))?;

        read_bytes_capped(SERVICE, response, self.max_download_bytes).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_strips_trailing_slash() {
        let config = ProviderConfig {
            api_base: "https://api.eu1.adobesign.com/".to_string(),
            ..ProviderConfig::default()
        };
        let client = AdobeSignClient::new(reqwest::Client::new(), &config);
        assert_eq!(
            client.url("/agreements"),
            "https://api.eu1.adobesign.com/api/rest/v6/agreements"
        );
        assert_eq!(client.max_download_bytes, 20 * 1024 * 1024);
    }
}
