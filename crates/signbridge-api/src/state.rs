//! Application state wiring all services together.
//!
//! The core services are generic over their ports; AppState pins them to the
//! JSON-file stores and the reqwest adapters from `signbridge-infra`.

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};

use signbridge_core::retry::RetryPolicy;
use signbridge_core::service::agreement::AgreementStore;
use signbridge_core::service::provider::SignatureProviderClient;
use signbridge_core::service::session::RepositorySession;
use signbridge_core::service::signature::SignatureService;
use signbridge_core::service::token::TokenManager;
use signbridge_core::service::workflow::WorkflowAdvancer;
use signbridge_core::webhook::processor::WebhookProcessor;
use signbridge_infra::adobe::{AdobeOAuthClient, AdobeSignClient};
use signbridge_infra::auth::RequestSigner;
use signbridge_infra::content_server::ContentServerClient;
use signbridge_infra::storage::{JsonFileAgreementBackend, JsonFileTokenRepository};
use signbridge_types::config::BridgeConfig;

/// Concrete type aliases for the service generics pinned to infra implementations.
pub type ConcreteTokenManager = TokenManager<JsonFileTokenRepository, AdobeOAuthClient>;

pub type ConcreteAgreementStore = AgreementStore<JsonFileAgreementBackend>;

pub type ConcreteSignatureService = SignatureService<
    AdobeSignClient,
    ConcreteTokenManager,
    ContentServerClient,
    JsonFileAgreementBackend,
>;

pub type ConcreteWebhookProcessor = WebhookProcessor<
    AdobeSignClient,
    ConcreteTokenManager,
    ContentServerClient,
    JsonFileAgreementBackend,
>;

/// Values the HTTP handlers read but never change.
pub struct AdminSettings {
    /// Configured provider client id, echoed on webhook verification.
    pub client_id: String,
    pub authorize_url: String,
    pub admin_user: String,
    pub admin_pass: SecretString,
}

/// Shared application state holding all services.
#[derive(Clone)]
pub struct AppState {
    pub tokens: Arc<ConcreteTokenManager>,
    pub agreements: Arc<ConcreteAgreementStore>,
    pub signature_service: Arc<ConcreteSignatureService>,
    pub webhook_processor: Arc<ConcreteWebhookProcessor>,
    pub signer: Arc<RequestSigner>,
    pub admin: Arc<AdminSettings>,
}

impl AppState {
    /// Create the storage directories, load durable state and wire services.
    pub async fn init(config: &BridgeConfig) -> anyhow::Result<Self> {
        let storage = &config.storage;
        let work_dir = storage.work_dir();
        tokio::fs::create_dir_all(&storage.data_dir).await?;
        tokio::fs::create_dir_all(&work_dir).await?;

        let client = signbridge_infra::http_client();

        let oauth = AdobeOAuthClient::new(client.clone(), config);
        let authorize_url = oauth.authorize_url()?;

        let tokens = Arc::new(
            TokenManager::load(JsonFileTokenRepository::new(storage.tokens_path()), oauth).await,
        );
        let agreements = Arc::new(
            AgreementStore::load(
                JsonFileAgreementBackend::new(storage.agreements_path()),
                config.agreements.duplicate_window_secs,
            )
            .await,
        );

        let provider = Arc::new(SignatureProviderClient::new(
            AdobeSignClient::new(client.clone(), &config.provider),
            tokens.clone(),
            RetryPolicy::new(
                config.provider.download_max_attempts,
                config.provider.download_retry_delay(),
            ),
            work_dir,
        ));
        let session = Arc::new(RepositorySession::new(ContentServerClient::new(
            client,
            &config.repository,
        )));
        let workflow = Arc::new(WorkflowAdvancer::new(session.clone()));

        let signature_service = Arc::new(SignatureService::new(
            provider.clone(),
            session.clone(),
            workflow.clone(),
            agreements.clone(),
        ));
        let webhook_processor = Arc::new(WebhookProcessor::new(
            provider,
            session,
            workflow,
            agreements.clone(),
        ));

        let security = &config.security;
        let signer = Arc::new(RequestSigner::new(
            &security.signature_secret,
            security.signature_max_age_secs,
        ));
        let admin = Arc::new(AdminSettings {
            client_id: config.provider.client_id.clone(),
            authorize_url,
            admin_user: security.admin_user.clone(),
            admin_pass: SecretString::from(security.admin_pass.expose_secret().to_string()),
        });

        tracing::info!(
            data_dir = %storage.data_dir.display(),
            agreements = agreements.all().await.len(),
            "application state initialized"
        );

        Ok(Self {
            tokens,
            agreements,
            signature_service,
            webhook_processor,
            signer,
            admin,
        })
    }
}
