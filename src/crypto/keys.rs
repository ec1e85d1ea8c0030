//! Caller key files
//!
//! A key file holds one hex-encoded secp256k1 secret key. Storage policy
//! (permissions, rotation, backups) belongs to whoever holds the file.

use rand::rngs::OsRng;
use secp256k1::{PublicKey, SecretKey};
use std::fs;
use std::path::Path;
use tracing::info;

use super::address::Address;
use super::signatures::SignatureManager;
use crate::error::CertificateError;

pub struct CallerKeypair {
    pub secret_key: SecretKey,
    pub public_key: PublicKey,
}

impl CallerKeypair {
    pub fn generate() -> Self {
        let secret_key = SecretKey::new(&mut OsRng);
        Self::from_secret_key(secret_key)
    }

    pub fn from_secret_key(secret_key: SecretKey) -> Self {
        let public_key = SignatureManager::new().public_key_from_secret(&secret_key);
        Self {
            secret_key,
            public_key,
        }
    }

    pub fn from_hex(secret_hex: &str) -> Result<Self, CertificateError> {
        let bytes = hex::decode(secret_hex.trim())
            .map_err(|e| CertificateError::CryptoError(format!("Invalid secret key hex: {}", e)))?;
        let secret_key = SecretKey::from_slice(&bytes)?;
        Ok(Self::from_secret_key(secret_key))
    }

    pub fn load(path: &Path) -> Result<Self, CertificateError> {
        let contents = fs::read_to_string(path).map_err(|e| {
            CertificateError::CryptoError(format!("Failed to read key file {:?}: {}", path, e))
        })?;
        Self::from_hex(&contents)
    }

    pub fn save(&self, path: &Path) -> Result<(), CertificateError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                CertificateError::CryptoError(format!("Failed to create key directory: {}", e))
            })?;
        }
        fs::write(path, hex::encode(self.secret_key.secret_bytes())).map_err(|e| {
            CertificateError::CryptoError(format!("Failed to write key file {:?}: {}", path, e))
        })?;
        info!("Wrote key for {} to {:?}", self.address(), path);
        Ok(())
    }

    pub fn address(&self) -> Address {
        Address::from_public_key(&self.public_key)
    }

    pub fn public_key_hex(&self) -> String {
        hex::encode(self.public_key.serialize())
    }
}
