//! Authenticated session against the content repository.
//!
//! Holds the repository ticket in memory and re-authenticates lazily when it
//! is missing or close to expiry.

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use signbridge_types::error::UpstreamError;
use signbridge_types::token::expiry_after;

use crate::upstream::content::{ContentServerApi, TaskUpdate};

/// Re-authenticate this many seconds before the ticket expires.
pub const TICKET_BUFFER_SECS: i64 = 30;

#[derive(Debug, Clone)]
struct CachedTicket {
    value: String,
    expires_at: DateTime<Utc>,
}

impl CachedTicket {
    fn is_fresh_at(&self, now: DateTime<Utc>) -> bool {
        expiry_after(now, TICKET_BUFFER_SECS).is_some_and(|t| t < self.expires_at)
    }
}

/// Where an uploaded document ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Publication {
    /// A same-named document existed; a version was added to it.
    NewVersion { node_id: String },
    /// No document had that name; a new node was created.
    Created { node_id: String },
}

impl Publication {
    pub fn node_id(&self) -> &str {
        match self {
            Publication::NewVersion { node_id } | Publication::Created { node_id } => node_id,
        }
    }
}

pub struct RepositorySession<A: ContentServerApi> {
    api: A,
    ticket: Mutex<Option<CachedTicket>>,
}

impl<A: ContentServerApi> RepositorySession<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            ticket: Mutex::new(None),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Return a valid ticket, authenticating when needed.
    pub async fn ensure_ticket(&self) -> Result<String, UpstreamError> {
        let mut cached = self.ticket.lock().await;
        if let Some(ticket) = cached.as_ref().filter(|t| t.is_fresh_at(Utc::now())) {
            return Ok(ticket.value.clone());
        }

        let issued = self.api.authenticate().await?;
        tracing::debug!(valid_for_secs = issued.valid_for_secs, "acquired repository ticket");
        let ttl = issued.valid_for_secs;
        let expires_at = expiry_after(Utc::now(), ttl).ok_or_else(|| UpstreamError::Decode {
            service: "otcs",
            message: format!("ticket lifetime of {ttl}s is out of range"),
        })?;
        let value = issued.value.clone();
        *cached = Some(CachedTicket {
            value: issued.value,
            expires_at,
        });
        Ok(value)
    }

    /// Raw bytes of one version of a node.
    pub async fn download_node(
        &self,
        node_id: &str,
        version: u32,
    ) -> Result<Vec<u8>, UpstreamError> {
        let ticket = self.ensure_ticket().await?;
        self.api.download_version(&ticket, node_id, version).await
    }

    /// Publish `bytes` under `folder_id`, versioning a same-named document
    /// when one exists.
    pub async fn upload_to_folder(
        &self,
        folder_id: &str,
        bytes: Vec<u8>,
        file_name: &str,
    ) -> Result<Publication, UpstreamError> {
        let ticket = self.ensure_ticket().await?;
        match self.api.find_document(&ticket, folder_id, file_name).await? {
            Some(node_id) => {
                self.api
                    .add_version(&ticket, &node_id, bytes, file_name)
                    .await?;
                tracing::info!(folder_id, node_id = %node_id, file_name, "added document version");
                Ok(Publication::NewVersion { node_id })
            }
            None => {
                let node_id = self
                    .api
                    .create_document(&ticket, folder_id, bytes, file_name)
                    .await?;
                tracing::info!(folder_id, node_id = %node_id, file_name, "created document");
                Ok(Publication::Created { node_id })
            }
        }
    }

    pub async fn update_task(&self, update: &TaskUpdate) -> Result<(), UpstreamError> {
        let ticket = self.ensure_ticket().await?;
        self.api.update_task(&ticket, update).await
    }
}
