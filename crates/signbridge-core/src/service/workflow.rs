//! Moves workflow tasks in the content repository.

use std::sync::Arc;

use signbridge_types::agreement::{AgreementRecord, Disposition};
use signbridge_types::error::UpstreamError;

use crate::service::session::RepositorySession;
use crate::upstream::content::{ContentServerApi, TaskAction, TaskUpdate};

/// Task slot that receives the terminal disposition.
pub const TERMINAL_TASK_ID: &str = "3";

pub const ADVANCE_COMMENT: &str = "Document sent for signature (automated step)";

/// One task state change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendOnRequest {
    pub workflow_id: String,
    pub subworkflow_id: String,
    pub task_id: String,
    /// Custom terminal action; `None` sends the task on.
    pub disposition: Option<Disposition>,
    pub comment: Option<String>,
}

/// Result of a disposition attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispositionResult {
    Delivered,
    /// The record carries no workflow to notify.
    Skipped,
    Failed(String),
}

impl DispositionResult {
    pub fn is_delivered(&self) -> bool {
        matches!(self, DispositionResult::Delivered)
    }
}

pub struct WorkflowAdvancer<A: ContentServerApi> {
    session: Arc<RepositorySession<A>>,
}

impl<A: ContentServerApi> WorkflowAdvancer<A> {
    pub fn new(session: Arc<RepositorySession<A>>) -> Self {
        Self { session }
    }

    pub async fn send_on_workflow(&self, request: &SendOnRequest) -> Result<(), UpstreamError> {
        let action = match request.disposition {
            Some(d) => TaskAction::Custom(d.as_str().to_string()),
            None => TaskAction::SendOn,
        };
        let update = TaskUpdate {
            workflow_id: request.workflow_id.clone(),
            subworkflow_id: request.subworkflow_id.clone(),
            task_id: request.task_id.clone(),
            action,
            comment: request.comment.clone(),
        };
        self.session.update_task(&update).await?;
        tracing::info!(
            workflow_id = %request.workflow_id,
            subworkflow_id = %request.subworkflow_id,
            task_id = %request.task_id,
            disposition = request.disposition.map(|d| d.as_str()),
            "workflow task updated"
        );
        Ok(())
    }

    /// Record a terminal disposition on the record's workflow.
    pub async fn trigger_disposition(
        &self,
        record: &AgreementRecord,
        disposition: Disposition,
    ) -> DispositionResult {
        if record.workflow_id.is_empty() {
            tracing::warn!(
                node_id = %record.node_id,
                %disposition,
                "no workflow id on record, skipping disposition"
            );
            return DispositionResult::Skipped;
        }

        let request = SendOnRequest {
            workflow_id: record.workflow_id.clone(),
            subworkflow_id: record.effective_subworkflow_id().to_string(),
            task_id: TERMINAL_TASK_ID.to_string(),
            disposition: Some(disposition),
            comment: Some(format!(
                "Document {} via webhook",
                disposition.as_str().to_lowercase()
            )),
        };

        match self.send_on_workflow(&request).await {
            Ok(()) => DispositionResult::Delivered,
            Err(e) => {
                tracing::error!(
                    workflow_id = %record.workflow_id,
                    %disposition,
                    error = %e,
                    "disposition failed"
                );
                DispositionResult::Failed(e.to_string())
            }
        }
    }
}
