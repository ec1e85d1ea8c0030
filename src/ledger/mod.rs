//! Certificate Ledger
//!
//! Append-only mapping from certificate identifier to
//! (fingerprint, issuer, timestamp). Each identifier can be written once,
//! by an authorized issuer, and is never changed afterwards.

pub mod call;
pub mod memory;
pub mod record;
pub mod sqlite;
pub mod store;

pub use call::{CallOutcome, LedgerCall, SignedLedgerCall};
pub use memory::InMemoryLedger;
pub use record::CertificateRecord;
pub use sqlite::SqliteLedger;
pub use store::LedgerStore;

use std::sync::Arc;
use tracing::{info, warn};

use crate::crypto::Address;
use crate::error::CertificateError;
use crate::hashing::CertificateFingerprint;

/// Protocol entry point over any [`LedgerStore`]
#[derive(Clone)]
pub struct CertificateLedger {
    store: Arc<dyn LedgerStore>,
}

impl CertificateLedger {
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self { store }
    }

    pub async fn admin(&self) -> Result<Address, CertificateError> {
        self.store.admin().await
    }

    pub async fn add_issuer(&self, caller: &Address, target: &Address) -> Result<bool, CertificateError> {
        match self.store.add_issuer(caller, target).await {
            Err(CertificateError::Unauthorized(who)) => {
                warn!("Rejected add_issuer from non-admin {}", who);
                Err(CertificateError::Unauthorized(who))
            }
            other => other,
        }
    }

    pub async fn is_authorized(&self, address: &Address) -> Result<bool, CertificateError> {
        self.store.is_authorized(address).await
    }

    /// Anchor `fingerprint` under `identifier`. Either the whole record is
    /// created or nothing is.
    pub async fn issue(
        &self,
        caller: &Address,
        identifier: &str,
        fingerprint: &CertificateFingerprint,
    ) -> Result<CertificateRecord, CertificateError> {
        if identifier.is_empty() {
            return Err(CertificateError::empty_identifier());
        }

        match self.store.submit_record(caller, identifier, fingerprint).await {
            Ok(record) => {
                info!("Issued certificate {}", record.summary());
                Ok(record)
            }
            Err(e) => {
                warn!("Issuance of {} by {} failed: {}", identifier, caller, e);
                Err(e)
            }
        }
    }

    /// `Ok(None)` means the identifier was never issued
    pub async fn lookup(&self, identifier: &str) -> Result<Option<CertificateRecord>, CertificateError> {
        if identifier.is_empty() {
            return Ok(None);
        }
        self.store.read_record(identifier).await
    }

    /// Authenticate a signed call and run it as the signing address
    pub async fn execute(&self, signed: &SignedLedgerCall) -> Result<CallOutcome, CertificateError> {
        let caller = signed.authenticate()?;

        match &signed.call {
            LedgerCall::AddIssuer { target } => {
                let newly_added = self.add_issuer(&caller, target).await?;
                Ok(CallOutcome::IssuerAdded {
                    target: target.clone(),
                    newly_added,
                })
            }
            LedgerCall::Issue {
                identifier,
                fingerprint,
            } => {
                let record = self.issue(&caller, identifier, fingerprint).await?;
                Ok(CallOutcome::Issued { record })
            }
        }
    }
}
