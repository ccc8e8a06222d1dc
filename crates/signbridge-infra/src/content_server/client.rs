//! ContentServerClient -- concrete [`ContentServerApi`] implementation.
//!
//! Every call after `authenticate` carries the session ticket in the
//! `OTCSTicket` header.

use reqwest::multipart::{Form, Part};
use secrecy::{ExposeSecret, SecretString};

use signbridge_core::upstream::content::{ContentServerApi, IssuedTicket, TaskAction, TaskUpdate};
use signbridge_types::config::RepositoryConfig;
use signbridge_types::error::UpstreamError;

use super::SERVICE;
use super::types::{AuthRequest, AuthResponse, CreatedNode, DOCUMENT_SUBTYPE, NodeListing};
use crate::http::{decode, ensure_success, id_string, read_json, transport};

const TICKET_HEADER: &str = "OTCSTicket";

pub struct ContentServerClient {
    client: reqwest::Client,
    base_url: String,
    username: String,
    password: SecretString,
}

impl ContentServerClient {
    pub fn new(client: reqwest::Client, config: &RepositoryConfig) -> Self {
        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            username: config.username.clone(),
            password: SecretString::from(config.password.expose_secret().to_string()),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn pdf_part(bytes: Vec<u8>, file_name: &str) -> Result<Part, UpstreamError> {
        Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str("application/pdf")
            .map_err(|e| decode(SERVICE, e.to_string()))
    }
}

/// Form fields for a task update.
pub(crate) fn task_form(update: &TaskUpdate) -> Vec<(&'static str, String)> {
    let mut form = match &update.action {
        TaskAction::Custom(action) => vec![("custom_action", action.clone())],
        TaskAction::SendOn => vec![("action", "sendon".to_string())],
    };
    if let Some(comment) = update.comment.as_ref().filter(|c| !c.is_empty()) {
        form.push(("comment", comment.clone()));
    }
    form
}

impl ContentServerApi for ContentServerClient {
    async fn authenticate(&self) -> Result<IssuedTicket, UpstreamError> {
        let response = self
            .client
            .post(self.url("/v1/auth"))
            .json(&AuthRequest {
                username: &self.username,
                password: self.password.expose_secret(),
            })
            .send()
            .await
            .map_err(|e| transport(SERVICE, e))?;

        let body: AuthResponse = read_json(SERVICE, response).await?;
        let (value, valid_for_secs) = body
            .into_ticket()
            .ok_or_else(|| decode(SERVICE, "authentication response carried no ticket"))?;
        Ok(IssuedTicket {
            value,
            valid_for_secs,
        })
    }

    async fn download_version(
        &self,
        ticket: &str,
        node_id: &str,
        version: u32,
    ) -> Result<Vec<u8>, UpstreamError> {
        let response = self
            .client
            .get(self.url(&format!("/v1/nodes/{node_id}/versions/{version}/content")))
            .header(TICKET_HEADER, ticket)
            .send()
            .await
            .map_err(|e| transport(SERVICE, e))?;

        let response = ensure_success(SERVICE, response).await?;
        let bytes = response.bytes().await.map_err(|e| transport(SERVICE, e))?;
        Ok(bytes.to_vec())
    }

    async fn find_document(
        &self,
        ticket: &str,
        folder_id: &str,
        name: &str,
    ) -> Result<Option<String>, UpstreamError> {
        let response = self
            .client
            .get(self.url(&format!("/v1/nodes/{folder_id}/nodes")))
            .query(&[("where_name", name)])
            .header(TICKET_HEADER, ticket)
            .send()
            .await
            .map_err(|e| transport(SERVICE, e))?;

        let listing: NodeListing = read_json(SERVICE, response).await?;
        Ok(listing.find_document(name))
    }

    async fn add_version(
        &self,
        ticket: &str,
        node_id: &str,
        bytes: Vec<u8>,
        file_name: &str,
    ) -> Result<(), UpstreamError> {
        let form = Form::new().part("file", Self::pdf_part(bytes, file_name)?);
        let response = self
            .client
            .post(self.url(&format!("/v1/nodes/{node_id}/versions")))
            .header(TICKET_HEADER, ticket)
            .multipart(form)
            .send()
            .await
            .map_err(|e| transport(SERVICE, e))?;

        ensure_success(SERVICE, response).await?;
        Ok(())
    }

    async fn create_document(
        &self,
        ticket: &str,
        folder_id: &str,
        bytes: Vec<u8>,
        file_name: &str,
    ) -> Result<String, UpstreamError> {
        let form = Form::new()
            .part("file", Self::pdf_part(bytes, file_name)?)
            .text("parent_id", folder_id.to_string())
            .text("type", DOCUMENT_SUBTYPE.to_string())
            .text("name", file_name.to_string());

        let response = self
            .client
            .post(self.url("/v1/nodes"))
            .header(TICKET_HEADER, ticket)
            .multipart(form)
            .send()
            .await
            .map_err(|e| transport(SERVICE, e))?;

        let created: CreatedNode = read_json(SERVICE, response).await?;
        id_string(&created.id).ok_or_else(|| decode(SERVICE, "created node has no id"))
    }

    async fn update_task(&self, ticket: &str, update: &TaskUpdate) -> Result<(), UpstreamError> {
        let url = self.url(&format!(
            "/v2/processes/{}/subprocesses/{}/tasks/{}",
            update.workflow_id, update.subworkflow_id, update.task_id
        ));
        let response = self
            .client
            .put(url)
            .header(TICKET_HEADER, ticket)
            .form(&task_form(update))
            .send()
            .await
            .map_err(|e| transport(SERVICE, e))?;

        ensure_success(SERVICE, response).await?;
        Ok(())
    }
}
