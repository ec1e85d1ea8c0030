//! Certificate Fingerprint
//!
//! `fingerprint(name, course, date)` is SHA-256 over
//! `name|course|date`, rendered as 64 lowercase hex characters.
//! Fields are hashed exactly as given: no trimming, no case folding.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

use crate::error::CertificateError;

/// Separator placed between fields before hashing. Issuers and verifiers
/// must agree on it or no fingerprint will ever match.
pub const FIELD_DELIMITER: &str = "|";

const FINGERPRINT_HEX_LEN: usize = 64;

/// Hex-encoded SHA-256 digest of certificate content
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CertificateFingerprint(String);

impl CertificateFingerprint {
    /// Parse a fingerprint received from outside (ledger rows, CLI args).
    /// Accepts upper or lower case hex and normalizes to lowercase.
    pub fn parse(value: &str) -> Result<Self, CertificateError> {
        if value.len() != FINGERPRINT_HEX_LEN {
            return Err(CertificateError::CryptoError(format!(
                "Fingerprint must be {} hex characters, got {}",
                FINGERPRINT_HEX_LEN,
                value.len()
            )));
        }
        if !value.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(CertificateError::CryptoError(format!(
                "Fingerprint is not hex: {}",
                value
            )));
        }
        Ok(Self(value.to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CertificateFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for CertificateFingerprint {
    type Err = CertificateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for CertificateFingerprint {
    type Error = CertificateError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<CertificateFingerprint> for String {
    fn from(value: CertificateFingerprint) -> Self {
        value.0
    }
}

/// Compute the fingerprint of a certificate's content
pub fn fingerprint(name: &str, course: &str, date: &str) -> CertificateFingerprint {
    let mut hasher = Sha256::new();
    hasher.update(name.as_bytes());
    hasher.update(FIELD_DELIMITER.as_bytes());
    hasher.update(course.as_bytes());
    hasher.update(FIELD_DELIMITER.as_bytes());
    hasher.update(date.as_bytes());
    CertificateFingerprint(hex::encode(hasher.finalize()))
}

/// The content a certificate attests to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateFields {
    pub name: String,
    pub course: String,
    pub date: String,
}

impl CertificateFields {
    pub fn new(name: impl Into<String>, course: impl Into<String>, date: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            course: course.into(),
            date: date.into(),
        }
    }

    pub fn fingerprint(&self) -> CertificateFingerprint {
        fingerprint(&self.name, &self.course, &self.date)
    }

    /// Whether these fields hash to the given fingerprint
    pub fn matches(&self, expected: &CertificateFingerprint) -> bool {
        &self.fingerprint() == expected
    }
}
