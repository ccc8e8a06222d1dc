//! In-memory fakes for the upstream ports, shared by the core's unit tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};
use std::time::Duration;

use signbridge_types::error::{TokenError, UpstreamError};
use signbridge_types::token::TokenGrant;

use crate::service::token::AccessTokenSource;
use crate::upstream::content::{ContentServerApi, IssuedTicket, TaskUpdate};
use crate::upstream::oauth::OAuthGrant;
use crate::upstream::signature::{AgreementRequest, SignatureApi};

pub fn status_error(service: &'static str, status: u16, body: &str) -> UpstreamError {
    UpstreamError::Status {
        service,
        status,
        body: body.to_string(),
    }
}

// ---------------------------------------------------------------------------
// FakeGrant
// ---------------------------------------------------------------------------

pub struct FakeGrant {
    pub refresh_calls: AtomicUsize,
    pub exchange_calls: AtomicUsize,
    response: Result<TokenGrant, UpstreamError>,
    latency: Duration,
}

impl FakeGrant {
    pub fn ok(access: &str, expires_in: i64, refresh: Option<&str>) -> Self {
        Self {
            refresh_calls: AtomicUsize::new(0),
            exchange_calls: AtomicUsize::new(0),
            response: Ok(TokenGrant {
                access_token: access.to_string(),
                expires_in,
                refresh_token: refresh.map(str::to_string),
            }),
            latency: Duration::ZERO,
        }
    }

    pub fn failing(error: UpstreamError) -> Self {
        Self {
            refresh_calls: AtomicUsize::new(0),
            exchange_calls: AtomicUsize::new(0),
            response: Err(error),
            latency: Duration::ZERO,
        }
    }

    /// Delay every grant so concurrent callers overlap.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn refreshes(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }
}

impl OAuthGrant for FakeGrant {
    async fn refresh(&self, _refresh_token: &str) -> Result<TokenGrant, UpstreamError> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        self.response.clone()
    }

    async fn exchange_code(&self, _code: &str) -> Result<TokenGrant, UpstreamError> {
        self.exchange_calls.fetch_add(1, Ordering::SeqCst);
        self.response.clone()
    }
}

// ---------------------------------------------------------------------------
// StaticToken
// ---------------------------------------------------------------------------

/// Token source that always answers the same way.
pub struct StaticToken {
    missing: bool,
}

impl StaticToken {
    pub fn valid() -> Self {
        Self { missing: false }
    }

    pub fn missing() -> Self {
        Self { missing: true }
    }
}

impl AccessTokenSource for StaticToken {
    async fn access_token(&self) -> Result<String, TokenError> {
        if self.missing {
            Err(TokenError::RefreshTokenMissing)
        } else {
            Ok("test-access-token".to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// FakeSignatureApi
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct FakeSignatureApi {
    /// Remaining 403 answers before the combined document is ready.
    pending_downloads: AtomicU32,
    download_failure: Mutex<Option<UpstreamError>>,
    create_failure: Mutex<Option<UpstreamError>>,
    pub download_calls: AtomicU32,
    pub uploads: Mutex<Vec<String>>,
    pub agreements: Mutex<Vec<AgreementRequest>>,
}

impl FakeSignatureApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer the next `n` downloads with 403.
    pub fn pending_for(self, n: u32) -> Self {
        self.pending_downloads.store(n, Ordering::SeqCst);
        self
    }

    pub fn failing_downloads(self, error: UpstreamError) -> Self {
        *self.download_failure.lock().unwrap() = Some(error);
        self
    }

    pub fn failing_creates(self, error: UpstreamError) -> Self {
        *self.create_failure.lock().unwrap() = Some(error);
        self
    }

    pub fn downloads(&self) -> u32 {
        self.download_calls.load(Ordering::SeqCst)
    }
}

impl SignatureApi for FakeSignatureApi {
    async fn upload_transient_document(
        &self,
        _access_token: &str,
        _bytes: Vec<u8>,
        file_name: &str,
    ) -> Result<String, UpstreamError> {
        let mut uploads = self.uploads.lock().unwrap();
        uploads.push(file_name.to_string());
        Ok(format!("transient-{}", uploads.len()))
    }

    async fn create_agreement(
        &self,
        _access_token: &str,
        request: &AgreementRequest,
    ) -> Result<String, UpstreamError> {
        if let Some(err) = self.create_failure.lock().unwrap().clone() {
            return Err(err);
        }
        let mut agreements = self.agreements.lock().unwrap();
        agreements.push(request.clone());
        Ok(format!("agr-{}", agreements.len()))
    }

    async fn download_combined_document(
        &self,
        _access_token: &str,
        agreement_id: &str,
    ) -> Result<Vec<u8>, UpstreamError> {
        self.download_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.download_failure.lock().unwrap().clone() {
            return Err(err);
        }
        let pending = self.pending_downloads.load(Ordering::SeqCst);
        if pending > 0 {
            self.pending_downloads.store(pending - 1, Ordering::SeqCst);
            return Err(status_error("adobe-sign", 403, "AGREEMENT_NOT_SIGNED"));
        }
        Ok(format!("%PDF signed {agreement_id}").into_bytes())
    }
}

// ---------------------------------------------------------------------------
// FakeContentServer
// ---------------------------------------------------------------------------

/// Repository fake keeping documents by (folder, name).
pub struct FakeContentServer {
    pub auth_calls: AtomicUsize,
    ticket_ttl_secs: i64,
    documents: Mutex<HashMap<(String, String), String>>,
    pub created: Mutex<Vec<(String, String)>>,
    /// Bytes of every created document, keyed by folder.
    pub created_bytes: Mutex<Vec<(String, Vec<u8>)>>,
    pub versions: Mutex<Vec<(String, String)>>,
    pub downloads: Mutex<Vec<(String, String, u32)>>,
    pub task_updates: Mutex<Vec<TaskUpdate>>,
    fail_tasks: AtomicBool,
    fail_uploads: AtomicBool,
}

impl Default for FakeContentServer {
    fn default() -> Self {
        Self {
            auth_calls: AtomicUsize::new(0),
            ticket_ttl_secs: 1800,
            documents: Mutex::new(HashMap::new()),
            created: Mutex::new(Vec::new()),
            created_bytes: Mutex::new(Vec::new()),
            versions: Mutex::new(Vec::new()),
            downloads: Mutex::new(Vec::new()),
            task_updates: Mutex::new(Vec::new()),
            fail_tasks: AtomicBool::new(false),
            fail_uploads: AtomicBool::new(false),
        }
    }
}

impl FakeContentServer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ticket_ttl(mut self, secs: i64) -> Self {
        self.ticket_ttl_secs = secs;
        self
    }

    pub fn with_document(self, folder: &str, name: &str, id: &str) -> Self {
        self.documents
            .lock()
            .unwrap()
            .insert((folder.to_string(), name.to_string()), id.to_string());
        self
    }

    pub fn set_fail_tasks(&self, fail: bool) {
        self.fail_tasks.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_uploads(&self, fail: bool) {
        self.fail_uploads.store(fail, Ordering::SeqCst);
    }

    pub fn task_updates(&self) -> Vec<TaskUpdate> {
        self.task_updates.lock().unwrap().clone()
    }

    pub fn auths(&self) -> usize {
        self.auth_calls.load(Ordering::SeqCst)
    }
}

impl ContentServerApi for FakeContentServer {
    async fn authenticate(&self) -> Result<IssuedTicket, UpstreamError> {
        let n = self.auth_calls.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(IssuedTicket {
            value: format!("ticket-{n}"),
            valid_for_secs: self.ticket_ttl_secs,
        })
    }

    async fn download_version(
        &self,
        ticket: &str,
        node_id: &str,
        version: u32,
    ) -> Result<Vec<u8>, UpstreamError> {
        self.downloads
            .lock()
            .unwrap()
            .push((ticket.to_string(), node_id.to_string(), version));
        Ok(format!("%PDF original {node_id}").into_bytes())
    }

    async fn find_document(
        &self,
        _ticket: &str,
        folder_id: &str,
        name: &str,
    ) -> Result<Option<String>, UpstreamError> {
        Ok(self
            .documents
            .lock()
            .unwrap()
            .get(&(folder_id.to_string(), name.to_string()))
            .cloned())
    }

    async fn add_version(
        &self,
        _ticket: &str,
        node_id: &str,
        _bytes: Vec<u8>,
        file_name: &str,
    ) -> Result<(), UpstreamError> {
        if self.fail_uploads.load(Ordering::SeqCst) {
            return Err(status_error("otcs", 500, "upload failed"));
        }
        self.versions
            .lock()
            .unwrap()
            .push((node_id.to_string(), file_name.to_string()));
        Ok(())
    }

    async fn create_document(
        &self,
        _ticket: &str,
        folder_id: &str,
        bytes: Vec<u8>,
        file_name: &str,
    ) -> Result<String, UpstreamError> {
        if self.fail_uploads.load(Ordering::SeqCst) {
            return Err(status_error("otcs", 500, "upload failed"));
        }
        self.created_bytes
            .lock()
            .unwrap()
            .push((folder_id.to_string(), bytes));
        let mut created = self.created.lock().unwrap();
        created.push((folder_id.to_string(), file_name.to_string()));
        let id = format!("doc-{}", created.len());
        self.documents
            .lock()
            .unwrap()
            .insert((folder_id.to_string(), file_name.to_string()), id.clone());
        Ok(id)
    }

    async fn update_task(&self, _ticket: &str, update: &TaskUpdate) -> Result<(), UpstreamError> {
        if self.fail_tasks.load(Ordering::SeqCst) {
            return Err(status_error("otcs", 500, "workflow engine unavailable"));
        }
        self.task_updates.lock().unwrap().push(update.clone());
        Ok(())
    }
}
