//! Signed ledger calls
//!
//! Writes reach the ledger as calls signed by the caller's key. The caller
//! address is derived from the signing public key, never taken from the
//! payload.

use serde::{Deserialize, Serialize};

use super::record::CertificateRecord;
use crate::crypto::{Address, CallerKeypair, SignatureManager};
use crate::error::CertificateError;
use crate::hashing::CertificateFingerprint;

const CALL_DOMAIN: &str = "certificate-ledger/v1";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum LedgerCall {
    AddIssuer {
        target: Address,
    },
    Issue {
        identifier: String,
        fingerprint: CertificateFingerprint,
    },
}

impl LedgerCall {
    /// The exact string that gets signed
    pub fn canonical_string(&self) -> String {
        match self {
            LedgerCall::AddIssuer { target } => {
                format!("{}|add_issuer|target:{}", CALL_DOMAIN, target)
            }
            LedgerCall::Issue {
                identifier,
                fingerprint,
            } => format!(
                "{}|issue|cert_hash:{}|cert_id:{}",
                CALL_DOMAIN, fingerprint, identifier
            ),
        }
    }

    pub fn sign(self, keypair: &CallerKeypair) -> Result<SignedLedgerCall, CertificateError> {
        let signature = SignatureManager::new().sign_hex(&self.canonical_string(), &keypair.secret_key)?;
        Ok(SignedLedgerCall {
            call: self,
            public_key: keypair.public_key_hex(),
            signature,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignedLedgerCall {
    pub call: LedgerCall,
    /// Compressed secp256k1 public key, hex
    pub public_key: String,
    /// Compact ECDSA signature over `call.canonical_string()`, hex
    pub signature: String,
}

impl SignedLedgerCall {
    /// Check the signature and return the caller address it proves
    pub fn authenticate(&self) -> Result<Address, CertificateError> {
        SignatureManager::new().recover_signer(
            &self.call.canonical_string(),
            &self.signature,
            &self.public_key,
        )
    }
}

/// Result of executing a ledger call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CallOutcome {
    IssuerAdded { target: Address, newly_added: bool },
    Issued { record: CertificateRecord },
}
