//! Ledger storage collaborator
//!
//! The certificate protocol only needs an append-once, read-consistent
//! store. Anything implementing [`LedgerStore`] can stand in for the shared
//! ledger: an in-process map for tests, SQLite for a single operator, or a
//! client for a remote chain.

use async_trait::async_trait;
use chrono::Utc;

use super::record::CertificateRecord;
use crate::crypto::Address;
use crate::error::CertificateError;
use crate::hashing::CertificateFingerprint;

#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// The admin fixed when the ledger was initialized
    async fn admin(&self) -> Result<Address, CertificateError>;

    /// Admin-only; returns whether `target` was newly added
    async fn add_issuer(&self, caller: &Address, target: &Address) -> Result<bool, CertificateError>;

    async fn is_authorized(&self, address: &Address) -> Result<bool, CertificateError>;

    /// Create a record if `caller` is an authorized issuer and `identifier`
    /// has no record yet. The authorization check, the duplicate check and
    /// the write must behave as one step: of several concurrent submissions
    /// for the same identifier exactly one succeeds.
    async fn submit_record(
        &self,
        caller: &Address,
        identifier: &str,
        fingerprint: &CertificateFingerprint,
    ) -> Result<CertificateRecord, CertificateError>;

    async fn read_record(&self, identifier: &str) -> Result<Option<CertificateRecord>, CertificateError>;

    /// Ledger time assigned to newly accepted records, in unix seconds
    fn current_time(&self) -> u64 {
        Utc::now().timestamp().max(0) as u64
    }
}
