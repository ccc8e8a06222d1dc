//! Applies provider webhook events to tracked agreements.

use std::sync::Arc;

use signbridge_types::event::WebhookEvent;

use crate::repository::agreement::AgreementBackend;
use crate::service::agreement::AgreementStore;
use crate::service::provider::SignatureProviderClient;
use crate::service::session::{Publication, RepositorySession};
use crate::service::token::AccessTokenSource;
use crate::service::workflow::{DispositionResult, WorkflowAdvancer};
use crate::upstream::content::ContentServerApi;
use crate::upstream::signature::SignatureApi;
use crate::webhook::keyed::KeyedMutex;
use crate::webhook::state::transition;

/// Why an event was acknowledged without action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IgnoreReason {
    MissingAgreementId,
    UnhandledEvent(String),
    UnknownAgreement(String),
}

/// What happened to the signed document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepublishResult {
    Published(Publication),
    /// The provider never produced the document.
    Unavailable,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventOutcome {
    Ignored(IgnoreReason),
    Processed {
        republish: RepublishResult,
        /// `None` when the event did not call for a disposition.
        disposition: Option<DispositionResult>,
        closed: bool,
    },
}

pub struct WebhookProcessor<S, T, C, B>
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
    /// Serializes deliveries for the same agreement.
    turns: KeyedMutex,
}

impl<S, T, C, B> WebhookProcessor<S, T, C, B>
where
    S: SignatureApi,
    T: AccessTokenSource,
    C: ContentServerApi,
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
            turns: KeyedMutex::new(),
        }
    }

    /// Handle one event. Never fails; problems are logged and reported in
    /// the outcome.
    pub async fn process(&self, event: &WebhookEvent) -> EventOutcome {
        let Some(agreement_id) = event.agreement_id.as_deref() else {
            tracing::info!(kind = %event.kind, "webhook event without agreement id");
            return EventOutcome::Ignored(IgnoreReason::MissingAgreementId);
        };

        tracing::info!(
            agreement_id,
            kind = %event.kind,
            participant = event.participant.as_deref().unwrap_or("unknown"),
            event_date = event.event_date.as_deref(),
            "webhook event received"
        );

        if !event.kind.affects_document() {
            return EventOutcome::Ignored(IgnoreReason::UnhandledEvent(
                event.kind.as_str().to_string(),
            ));
        }

        if self.store.get(agreement_id).await.is_none() {
            tracing::info!(agreement_id, "event for untracked agreement");
            return EventOutcome::Ignored(IgnoreReason::UnknownAgreement(agreement_id.to_string()));
        }

        let _turn = self.turns.lock(agreement_id).await;
        // Read again: an earlier delivery may have closed the record meanwhile.
        let Some(record) = self.store.get(agreement_id).await else {
            return EventOutcome::Ignored(IgnoreReason::UnknownAgreement(agreement_id.to_string()));
        };

        let step = transition(record.state(), &event.kind);
        let file_name = record.document_name();

        let republish = match self
            .provider
            .download_signed_document_with_retry(agreement_id, &file_name)
            .await
        {
            Some(path) => self.republish(&record.attach_id, &path, &file_name).await,
            None => RepublishResult::Unavailable,
        };

        let Some(disposition) = step.disposition else {
            return EventOutcome::Processed {
                republish,
                disposition: None,
                closed: false,
            };
        };

        if let RepublishResult::Failed(_) = republish {
            tracing::warn!(agreement_id, "signed document not published, deferring disposition");
            return EventOutcome::Processed {
                republish,
                disposition: None,
                closed: false,
            };
        }

        let result = self.workflow.trigger_disposition(&record, disposition).await;
        let closed = result.is_delivered() && self.close(agreement_id).await;

        EventOutcome::Processed {
            republish,
            disposition: Some(result),
            closed,
        }
    }

    async fn republish(
        &self,
        folder_id: &str,
        path: &std::path::Path,
        file_name: &str,
    ) -> RepublishResult {
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::error!(
                    path = %path.display(),
                    error = %e,
                    "failed to read signed document"
                );
                return RepublishResult::Failed(e.to_string());
            }
        };
        match self.session.upload_to_folder(folder_id, bytes, file_name).await {
            Ok(publication) => RepublishResult::Published(publication),
            Err(e) => {
                tracing::error!(folder_id, error = %e, "failed to publish signed document");
                RepublishResult::Failed(e.to_string())
            }
        }
    }

    async fn close(&self, agreement_id: &str) -> bool {
        match self.store.mark_send_on_done(agreement_id).await {
            Ok(Some(_)) => {
                tracing::info!(agreement_id, "agreement closed");
                true
            }
            Ok(None) => false,
            Err(e) => {
                tracing::error!(agreement_id, error = %e, "failed to persist closed agreement");
                false
            }
        }
    }
}
