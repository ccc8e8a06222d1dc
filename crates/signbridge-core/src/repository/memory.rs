//! In-memory backings for the repository traits.
//!
//! Useful for tests and for running without a data directory. Each backing
//! counts its writes so tests can assert that a mutation really flushed.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use signbridge_types::error::RepositoryError;
use signbridge_types::token::OAuthTokenState;

use super::agreement::{AgreementBackend, AgreementMap};
use super::token::TokenRepository;

fn lock_poisoned<T>(e: std::sync::PoisonError<T>) -> RepositoryError {
    RepositoryError::Io(format!("lock poisoned: {e}"))
}

/// In-memory token document.
#[derive(Default)]
pub struct InMemoryTokenRepository {
    state: Mutex<Option<OAuthTokenState>>,
    saves: AtomicUsize,
}

impl InMemoryTokenRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with a previously persisted token.
    pub fn with_state(state: OAuthTokenState) -> Self {
        Self {
            state: Mutex::new(Some(state)),
            saves: AtomicUsize::new(0),
        }
    }

    /// The last saved document.
    pub fn stored(&self) -> Option<OAuthTokenState> {
        self.state.lock().ok().and_then(|s| s.clone())
    }

    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

impl TokenRepository for InMemoryTokenRepository {
    async fn load(&self) -> Result<Option<OAuthTokenState>, RepositoryError> {
        Ok(self.state.lock().map_err(lock_poisoned)?.clone())
    }

    async fn save(&self, state: &OAuthTokenState) -> Result<(), RepositoryError> {
        *self.state.lock().map_err(lock_poisoned)? = Some(state.clone());
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// In-memory agreement document.
///
/// `fail_writes` simulates a full disk: flushes error out and leave the
/// stored copy untouched.
#[derive(Default)]
pub struct InMemoryAgreementBackend {
    records: Mutex<AgreementMap>,
    flushes: AtomicUsize,
    fail_writes: AtomicBool,
}

impl InMemoryAgreementBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: AgreementMap) -> Self {
        Self {
            records: Mutex::new(records),
            ..Self::default()
        }
    }

    /// Snapshot of the last flushed document.
    pub fn stored(&self) -> AgreementMap {
        self.records.lock().map(|r| r.clone()).unwrap_or_default()
    }

    pub fn flush_count(&self) -> usize {
        self.flushes.load(Ordering::SeqCst)
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

impl AgreementBackend for InMemoryAgreementBackend {
    async fn load(&self) -> Result<AgreementMap, RepositoryError> {
        Ok(self.records.lock().map_err(lock_poisoned)?.clone())
    }

    async fn flush(&self, records: &AgreementMap) -> Result<(), RepositoryError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(RepositoryError::Io("simulated write failure".to_string()));
        }
        *self.records.lock().map_err(lock_poisoned)? = records.clone();
        self.flushes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
