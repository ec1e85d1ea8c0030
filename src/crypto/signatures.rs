use crate::error::CertificateError;
use secp256k1::{ecdsa::Signature, PublicKey, Secp256k1, SecretKey};
use sha2::{Digest, Sha256};

use super::address::Address;

pub struct SignatureManager {
    secp: Secp256k1<secp256k1::All>,
}

impl SignatureManager {
    pub fn new() -> Self {
        Self {
            secp: Secp256k1::new(),
        }
    }

    pub fn create_signature(
        &self,
        message: &str,
        secret_key: &SecretKey,
    ) -> Result<Signature, CertificateError> {
        let message_hash = Sha256::digest(message.as_bytes());
        let message_hash = secp256k1::Message::from_digest_slice(&message_hash)
            .map_err(|e| CertificateError::CryptoError(format!("Invalid message hash: {}", e)))?;

        Ok(self.secp.sign_ecdsa(&message_hash, secret_key))
    }

    pub fn verify_signature(
        &self,
        message: &str,
        signature: &Signature,
        public_key: &PublicKey,
    ) -> Result<bool, CertificateError> {
        let message_hash = Sha256::digest(message.as_bytes());
        let message_hash = secp256k1::Message::from_digest_slice(&message_hash)
            .map_err(|e| CertificateError::CryptoError(format!("Invalid message hash: {}", e)))?;

        match self.secp.verify_ecdsa(&message_hash, signature, public_key) {
            Ok(_) => Ok(true),
            Err(_) => Ok(false),
        }
    }

    /// Sign and hex-encode (compact form) for transport
    pub fn sign_hex(&self, message: &str, secret_key: &SecretKey) -> Result<String, CertificateError> {
        let signature = self.create_signature(message, secret_key)?;
        Ok(hex::encode(signature.serialize_compact()))
    }

    /// Verify hex-encoded signature and public key, returning the signer's
    /// address. A well-formed signature that does not verify is an error.
    pub fn recover_signer(
        &self,
        message: &str,
        signature_hex: &str,
        public_key_hex: &str,
    ) -> Result<Address, CertificateError> {
        let signature_bytes = hex::decode(signature_hex)
            .map_err(|e| CertificateError::CryptoError(format!("Invalid signature hex: {}", e)))?;
        let signature = Signature::from_compact(&signature_bytes)?;

        let public_key_bytes = hex::decode(public_key_hex)
            .map_err(|e| CertificateError::CryptoError(format!("Invalid public key hex: {}", e)))?;
        let public_key = PublicKey::from_slice(&public_key_bytes)?;

        if !self.verify_signature(message, &signature, &public_key)? {
            return Err(CertificateError::CryptoError(
                "Signature does not match message".to_string(),
            ));
        }

        Ok(Address::from_public_key(&public_key))
    }

    pub fn public_key_from_secret(&self, secret_key: &SecretKey) -> PublicKey {
        PublicKey::from_secret_key(&self.secp, secret_key)
    }
}

impl Default for SignatureManager {
    fn default() -> Self {
        Self::new()
    }
}
