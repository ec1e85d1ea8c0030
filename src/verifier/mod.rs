//! Certificate Verification
//!
//! Read-only reconciliation of a claimed certificate identifier against the
//! ledger. Without expected fields the stored record is returned as-is so
//! the caller can recompute the fingerprint itself. With fields, the
//! fingerprint is recomputed here and compared.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::CertificateError;
use crate::hashing::{CertificateFields, CertificateFingerprint};
use crate::ledger::{CertificateLedger, CertificateRecord};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum VerificationOutcome {
    /// Nothing was ever issued under the identifier
    Absent,
    /// Record exists; no fields were supplied to check it against
    Present { record: CertificateRecord },
    /// Supplied fields hash to the stored fingerprint
    Match { record: CertificateRecord },
    /// Record exists but the supplied fields hash to something else
    Mismatch {
        record: CertificateRecord,
        computed: CertificateFingerprint,
    },
}

impl VerificationOutcome {
    pub fn record(&self) -> Option<&CertificateRecord> {
        match self {
            VerificationOutcome::Absent => None,
            VerificationOutcome::Present { record }
            | VerificationOutcome::Match { record }
            | VerificationOutcome::Mismatch { record, .. } => Some(record),
        }
    }

    /// Only a field-checked match counts as valid
    pub fn is_valid(&self) -> bool {
        matches!(self, VerificationOutcome::Match { .. })
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, VerificationOutcome::Absent)
    }
}

#[derive(Clone)]
pub struct Verifier {
    ledger: CertificateLedger,
}

impl Verifier {
    pub fn new(ledger: CertificateLedger) -> Self {
        Self { ledger }
    }

    pub async fn verify(
        &self,
        identifier: &str,
        expected_fields: Option<&CertificateFields>,
    ) -> Result<VerificationOutcome, CertificateError> {
        let Some(record) = self.ledger.lookup(identifier).await? else {
            debug!("No record for certificate {}", identifier);
            return Ok(VerificationOutcome::Absent);
        };

        let Some(fields) = expected_fields else {
            return Ok(VerificationOutcome::Present { record });
        };

        let computed = fields.fingerprint();
        if computed == record.fingerprint {
            info!("Certificate {} matches supplied fields", identifier);
            Ok(VerificationOutcome::Match { record })
        } else {
            warn!(
                "Certificate {} mismatch: stored {}, computed {}",
                identifier, record.fingerprint, computed
            );
            Ok(VerificationOutcome::Mismatch { record, computed })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::CallerKeypair;
    use crate::hashing::fingerprint;
    use crate::ledger::InMemoryLedger;
    use std::sync::Arc;

    async fn issued_ledger() -> (CertificateLedger, CallerKeypair) {
        let admin = CallerKeypair::generate();
        let ledger = CertificateLedger::new(Arc::new(InMemoryLedger::new(admin.address())));
        ledger.add_issuer(&admin.address(), &admin.address()).await.unwrap();
        ledger
            .issue(&admin.address(), "CERT-1", &fingerprint("Alice", "CS101", "2024-01-01"))
            .await
            .unwrap();
        (ledger, admin)
    }

    #[tokio::test]
    async fn test_absent_identifier() {
        let (ledger, _) = issued_ledger().await;
        let verifier = Verifier::new(ledger);

        let outcome = verifier.verify("CERT-2", None).await.unwrap();
        assert!(outcome.is_absent());
        assert!(outcome.record().is_none());

        let fields = CertificateFields::new("Alice", "CS101", "2024-01-01");
        assert!(verifier.verify("CERT-2", Some(&fields)).await.unwrap().is_absent());
    }

    #[tokio::test]
    async fn test_present_without_fields() {
        let (ledger, admin) = issued_ledger().await;
        let verifier = Verifier::new(ledger);

        let outcome = verifier.verify("CERT-1", None).await.unwrap();
        let record = outcome.record().unwrap();
        assert!(matches!(outcome, VerificationOutcome::Present { .. }));
        assert!(!outcome.is_valid());
        assert_eq!(record.issuer, admin.address());
    }

    #[tokio::test]
    async fn test_matching_fields() {
        let (ledger, _) = issued_ledger().await;
        let verifier = Verifier::new(ledger);

        let fields = CertificateFields::new("Alice", "CS101", "2024-01-01");
        let outcome = verifier.verify("CERT-1", Some(&fields)).await.unwrap();
        assert!(outcome.is_valid());
    }

    #[tokio::test]
    async fn test_mismatching_fields_report_computed_hash() {
        let (ledger, _) = issued_ledger().await;
        let verifier = Verifier::new(ledger);

        let fields = CertificateFields::new("Alice", "CS101", "2024-01-02");
        match verifier.verify("CERT-1", Some(&fields)).await.unwrap() {
            VerificationOutcome::Mismatch { record, computed } => {
                assert_eq!(computed, fields.fingerprint());
                assert_ne!(computed, record.fingerprint);
            }
            other => panic!("expected mismatch, got {:?}", other),
        }
    }
}
