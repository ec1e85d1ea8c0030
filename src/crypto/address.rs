//! Actor addresses
//!
//! An address is `0x` plus the last 20 bytes of SHA-256 over the
//! uncompressed secp256k1 public key (tag byte excluded), hex encoded.

use secp256k1::PublicKey;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

use crate::error::CertificateError;

const ADDRESS_BYTES: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(String);

impl Address {
    pub fn from_public_key(public_key: &PublicKey) -> Self {
        let uncompressed = public_key.serialize_uncompressed();
        let digest = Sha256::digest(&uncompressed[1..]);
        Self(format!("0x{}", hex::encode(&digest[digest.len() - ADDRESS_BYTES..])))
    }

    pub fn parse(value: &str) -> Result<Self, CertificateError> {
        let body = value
            .strip_prefix("0x")
            .or_else(|| value.strip_prefix("0X"))
            .ok_or_else(|| CertificateError::CryptoError(format!("Address must start with 0x: {}", value)))?;

        if body.len() != ADDRESS_BYTES * 2 || !body.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(CertificateError::CryptoError(format!(
                "Address must be 0x followed by {} hex characters: {}",
                ADDRESS_BYTES * 2,
                value
            )));
        }

        Ok(Self(format!("0x{}", body.to_ascii_lowercase())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Address {
    type Err = CertificateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Address {
    type Error = CertificateError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Address> for String {
    fn from(value: Address) -> Self {
        value.0
    }
}
