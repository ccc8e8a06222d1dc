//! Content repository (OTCS) REST port.

use signbridge_types::error::UpstreamError;

/// A freshly issued repository session ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedTicket {
    pub value: String,
    /// Lifetime reported by the server, in seconds.
    pub valid_for_secs: i64,
}

/// Task state change sent to the workflow engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskAction {
    /// Generic "send on" that moves the task to the next step.
    SendOn,
    /// A named custom disposition such as "Signed".
    Custom(String),
}

/// One task update call against a workflow subprocess.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskUpdate {
    pub workflow_id: String,
    pub subworkflow_id: String,
    pub task_id: String,
    pub action: TaskAction,
    pub comment: Option<String>,
}

/// Raw repository operations. Every call except `authenticate` carries a ticket.
pub trait ContentServerApi: Send + Sync {
    fn authenticate(
        &self,
    ) -> impl std::future::Future<Output = Result<IssuedTicket, UpstreamError>> + Send;

    fn download_version(
        &self,
        ticket: &str,
        node_id: &str,
        version: u32,
    ) -> impl std::future::Future<Output = Result<Vec<u8>, UpstreamError>> + Send;

    /// Id of the document named exactly `name` directly under `folder_id`.
    fn find_document(
        &self,
        ticket: &str,
        folder_id: &str,
        name: &str,
    ) -> impl std::future::Future<Output = Result<Option<String>, UpstreamError>> + Send;

    fn add_version(
        &self,
        ticket: &str,
        node_id: &str,
        bytes: Vec<u8>,
        file_name: &str,
    ) -> impl std::future::Future<Output = Result<(), UpstreamError>> + Send;

    /// Create a document node and return its id.
    fn create_document(
        &self,
        ticket: &str,
        folder_id: &str,
        bytes: Vec<u8>,
        file_name: &str,
    ) -> impl std::future::Future<Output = Result<String, UpstreamError>> + Send;

    fn update_task(
        &self,
        ticket: &str,
        update: &TaskUpdate,
    ) -> impl std::future::Future<Output = Result<(), UpstreamError>> + Send;
}
