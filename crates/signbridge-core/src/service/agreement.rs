//! Agreement bookkeeping.
//!
//! The full map lives in memory behind one async mutex. Every mutation holds
//! that mutex across the change and the whole-document flush, so concurrent
//! writers cannot lose each other's records.

use chrono::{DateTime, Duration, TimeDelta, Utc};
use tokio::sync::Mutex;

use signbridge_types::agreement::{AgreementRecord, AgreementUpdate, NewAgreement};
use signbridge_types::error::RepositoryError;

use crate::repository::agreement::{AgreementBackend, AgreementMap};

pub struct AgreementStore<B: AgreementBackend> {
    backend: B,
    records: Mutex<AgreementMap>,
    duplicate_window: Duration,
}

impl<B: AgreementBackend> AgreementStore<B> {
    /// Load every persisted record into memory.
    ///
    /// An unreadable document is logged and treated as empty. A window too
    /// large to represent covers all of history.
    pub async fn load(backend: B, duplicate_window_secs: i64) -> Self {
        let records = match backend.load().await {
            Ok(records) => {
                tracing::info!(count = records.len(), "loaded agreements");
                records
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to load agreements, starting empty");
                AgreementMap::new()
            }
        };
        Self {
            backend,
            records: Mutex::new(records),
            duplicate_window: TimeDelta::try_seconds(duplicate_window_secs.max(0))
                .unwrap_or(TimeDelta::MAX),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub async fn get(&self, agreement_id: &str) -> Option<AgreementRecord> {
        self.records.lock().await.get(agreement_id).cloned()
    }

    pub async fn all(&self) -> AgreementMap {
        self.records.lock().await.clone()
    }

    /// True when the same node was sent to the same recipients within the
    /// duplicate window.
    pub async fn is_duplicate(&self, node_id: &str, emails: &[String]) -> bool {
        self.is_duplicate_at(node_id, emails, Utc::now()).await
    }

    pub async fn is_duplicate_at(
        &self,
        node_id: &str,
        emails: &[String],
        now: DateTime<Utc>,
    ) -> bool {
        let cutoff = now
            .checked_sub_signed(self.duplicate_window)
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        self.records.lock().await.values().any(|r| {
            r.node_id == node_id && r.created_at > cutoff && r.same_recipients(emails)
        })
    }

    /// Insert a new pending record and flush.
    pub async fn create(
        &self,
        agreement_id: &str,
        agreement: NewAgreement,
    ) -> Result<AgreementRecord, RepositoryError> {
        self.create_at(agreement_id, agreement, Utc::now()).await
    }

    pub async fn create_at(
        &self,
        agreement_id: &str,
        agreement: NewAgreement,
        created_at: DateTime<Utc>,
    ) -> Result<AgreementRecord, RepositoryError> {
        let mut records = self.records.lock().await;
        if records.contains_key(agreement_id) {
            return Err(RepositoryError::Conflict(format!(
                "agreement {agreement_id} already exists"
            )));
        }
        let record = agreement.into_record(created_at);
        records.insert(agreement_id.to_string(), record.clone());
        self.backend.flush(&records).await?;
        tracing::debug!(agreement_id, "agreement recorded");
        Ok(record)
    }

    /// Merge `update` into an existing record and flush.
    ///
    /// Returns `None` for an unknown id.
    pub async fn update(
        &self,
        agreement_id: &str,
        update: AgreementUpdate,
    ) -> Result<Option<AgreementRecord>, RepositoryError> {
        let mut records = self.records.lock().await;
        let Some(record) = records.get_mut(agreement_id) else {
            return Ok(None);
        };
        update.apply_to(record);
        let updated = record.clone();
        self.backend.flush(&records).await?;
        Ok(Some(updated))
    }

    pub async fn mark_send_on_done(
        &self,
        agreement_id: &str,
    ) -> Result<Option<AgreementRecord>, RepositoryError> {
        self.update(agreement_id, AgreementUpdate::close()).await
    }
}
