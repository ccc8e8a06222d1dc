//! Agreement document storage trait.

use std::collections::BTreeMap;

use signbridge_types::agreement::AgreementRecord;
use signbridge_types::error::RepositoryError;

/// Whole agreement map, keyed by provider agreement id.
pub type AgreementMap = BTreeMap<String, AgreementRecord>;

/// Durable backing for the agreement map.
///
/// The store loads the full map once at startup and flushes the full map
/// after every mutation.
pub trait AgreementBackend: Send + Sync {
    /// Load every persisted record. Returns an empty map when nothing was saved.
    fn load(
        &self,
    ) -> impl std::future::Future<Output = Result<AgreementMap, RepositoryError>> + Send;

    /// Rewrite the persisted document with `records`.
    fn flush(
        &self,
        records: &AgreementMap,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;
}
