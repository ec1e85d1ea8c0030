pub mod api;
pub mod config;
pub mod crypto;
pub mod error;
pub mod hashing;
pub mod ledger;
pub mod registry;
pub mod verifier;

pub use error::CertificateError;
pub use hashing::{fingerprint, CertificateFields, CertificateFingerprint};
pub use ledger::{CertificateLedger, CertificateRecord, LedgerStore};
pub use verifier::{VerificationOutcome, Verifier};
