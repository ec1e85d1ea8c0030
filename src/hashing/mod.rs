//! Certificate Content Hashing
//!
//! Deterministic fingerprints over certificate content. The ledger only ever
//! stores the fingerprint, so anyone holding the original fields can
//! recompute it without write credentials.

pub mod fingerprint;

pub use fingerprint::{fingerprint, CertificateFields, CertificateFingerprint, FIELD_DELIMITER};
