use serde::{Deserialize, Serialize};

use crate::crypto::Address;
use crate::hashing::{CertificateFields, CertificateFingerprint};

/// Write-once ledger entry binding an identifier to a content fingerprint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateRecord {
    pub identifier: String,
    pub fingerprint: CertificateFingerprint,
    pub issuer: Address,
    /// Unix seconds at which the ledger accepted the record
    pub issued_at: u64,
}

impl CertificateRecord {
    pub fn matches_fields(&self, fields: &CertificateFields) -> bool {
        fields.matches(&self.fingerprint)
    }

    pub fn summary(&self) -> String {
        format!(
            "{} -> {} (issuer {}, at {})",
            self.identifier, self.fingerprint, self.issuer, self.issued_at
        )
    }
}
