use thiserror::Error;

impl From<sqlx::Error> for CertificateError {
    fn from(err: sqlx::Error) -> Self {
        Self::TransportFault(format!("Ledger storage error: {}", err))
    }
}

impl From<config::ConfigError> for CertificateError {
    fn from(err: config::ConfigError) -> Self {
        Self::ConfigError(err.to_string())
    }
}

impl From<secp256k1::Error> for CertificateError {
    fn from(err: secp256k1::Error) -> Self {
        Self::CryptoError(format!("secp256k1: {}", err))
    }
}

#[derive(Error, Debug)]
pub enum CertificateError {
    #[error("Unauthorized caller: {0}")]
    Unauthorized(String),

    #[error("Certificate identifier already issued: {0}")]
    DuplicateIdentifier(String),

    #[error("Invalid certificate identifier: {0}")]
    InvalidIdentifier(String),

    #[error("Ledger transport fault: {0}")]
    TransportFault(String),

    #[error("Cryptographic error: {0}")]
    CryptoError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl CertificateError {
    /// Transport faults may succeed on retry; every other variant is final
    /// for the given input.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::TransportFault(_))
    }

    pub fn unauthorized(caller: &crate::crypto::Address) -> Self {
        Self::Unauthorized(caller.to_string())
    }

    pub fn empty_identifier() -> Self {
        Self::InvalidIdentifier("identifier must not be empty".to_string())
    }
}
