//! Start-signature use case.
//!
//! Takes a validated request from the calling workflow, sends the repository
//! document out for signature and records the agreement so later webhook
//! events can be matched back to it.

use std::sync::Arc;

use tokio::task::JoinHandle;

use signbridge_types::agreement::NewAgreement;
use signbridge_types::error::StartError;

use crate::repository::agreement::AgreementBackend;
use crate::service::agreement::AgreementStore;
use crate::service::provider::SignatureProviderClient;
use crate::service::session::RepositorySession;
use crate::service::token::AccessTokenSource;
use crate::service::workflow::{ADVANCE_COMMENT, SendOnRequest, WorkflowAdvancer};
use crate::upstream::content::ContentServerApi;
use crate::upstream::signature::SignatureApi;
use crate::validation::StartSignature;

/// Version of the repository node that is sent out for signature.
const ORIGINAL_VERSION: u32 = 1;

/// An accepted start request.
#[derive(Debug)]
pub struct StartedAgreement {
    pub agreement_id: String,
    /// Background task advancing the workflow, when a workflow was named.
    pub advance: Option<JoinHandle<()>>,
}

pub struct SignatureService<S, T, C, B>
where
    S: SignatureApi,
    T: AccessTokenSource,
    C: ContentServerApi,
    B: AgreementBackend,
{
    provider: Arc<SignatureProviderClient<S, T>>,
    session: Arc<RepositorySession<C>>,
    workflow: Arc<WorkflowAdvancer<C>>,
    store: Arc<AgreementStore<B>>,
}

impl<S, T, C, B> SignatureService<S, T, C, B>
where
    S: SignatureApi,
    T: AccessTokenSource,
    C: ContentServerApi + 'static,
    B: AgreementBackend,
{
    pub fn new(
        provider: Arc<SignatureProviderClient<S, T>>,
        session: Arc<RepositorySession<C>>,
        workflow: Arc<WorkflowAdvancer<C>>,
        store: Arc<AgreementStore<B>>,
    ) -> Self {
        Self {
            provider,
            session,
            workflow,
            store,
        }
    }

    /// Send the node out for signature and record the agreement.
    pub async fn start(&self, request: StartSignature) -> Result<StartedAgreement, StartError> {
        if self.store.is_duplicate(&request.node_id, &request.emails).await {
            tracing::warn!(node_id = %request.node_id, "duplicate start request inside window");
            return Err(StartError::Duplicate);
        }

        self.provider.ensure_token().await?;

        let file_name = request.file_name();
        let bytes = self
            .session
            .download_node(&request.node_id, ORIGINAL_VERSION)
            .await?;
        tracing::debug!(
            node_id = %request.node_id,
            size = bytes.len(),
            "downloaded original document"
        );

        let transient_id = self
            .provider
            .upload_transient_document(bytes, &file_name)
            .await?;
        let agreement_id = self
            .provider
            .create_agreement(&transient_id, &file_name, &request.emails)
            .await?;

        self.store
            .create(
                &agreement_id,
                NewAgreement {
                    node_id: request.node_id.clone(),
                    attach_id: request.attach_id.clone(),
                    file_name: file_name.clone(),
                    workflow_id: request.workflow_id.clone(),
                    subworkflow_id: request.subworkflow_id.clone(),
                    emails: request.emails.clone(),
                },
            )
            .await?;

        tracing::info!(
            agreement_id = %agreement_id,
            node_id = %request.node_id,
            recipients = request.emails.len(),
            "agreement created"
        );

        let advance = request.workflow_id.clone().map(|workflow_id| {
            let send_on = SendOnRequest {
                subworkflow_id: request
                    .subworkflow_id
                    .clone()
                    .unwrap_or_else(|| workflow_id.clone()),
                workflow_id,
                task_id: request.task_id.clone(),
                disposition: None,
                comment: Some(ADVANCE_COMMENT.to_string()),
            };
            let workflow = self.workflow.clone();
            tokio::spawn(async move {
                if let Err(e) = workflow.send_on_workflow(&send_on).await {
                    tracing::error!(
                        workflow_id = %send_on.workflow_id,
                        task_id = %send_on.task_id,
                        error = %e,
                        "workflow advance after creation failed"
                    );
                }
            })
        });

        Ok(StartedAgreement {
            agreement_id,
            advance,
        })
    }
}
