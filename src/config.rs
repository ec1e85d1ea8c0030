use serde::{Deserialize, Serialize};
use std::env;
use std::net::SocketAddr;

use crate::error::CertificateError;

pub const DEFAULT_CONFIG_FILE: &str = "certificate-ledger";
pub const CONFIG_PATH_VAR: &str = "CERT_LEDGER_CONFIG";
pub const ENV_PREFIX: &str = "CERT_LEDGER";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server_host: String,
    pub server_port: u16,
    pub ledger_url: String,
    pub log_filter: String,
}

impl AppConfig {
    /// Defaults, then the optional config file, then `CERT_LEDGER_*`
    /// environment variables.
    pub fn load() -> Result<Self, CertificateError> {
        let path = env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        Self::load_from(&path)
    }

    pub fn load_from(path: &str) -> Result<Self, CertificateError> {
        let settings = config::Config::builder()
            .set_default("server_host", "0.0.0.0")?
            .set_default("server_port", 3000)?
            .set_default("ledger_url", "sqlite://certificates.db")?
            .set_default("log_filter", "certificate_ledger=debug,tower_http=debug")?
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::Environment::with_prefix(ENV_PREFIX))
            .build()?;

        let config: AppConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), CertificateError> {
        if self.ledger_url.trim().is_empty() {
            return Err(CertificateError::ConfigError(
                "ledger_url must not be empty".to_string(),
            ));
        }
        self.socket_addr()?;
        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, CertificateError> {
        format!("{}:{}", self.server_host, self.server_port)
            .parse()
            .map_err(|e| {
                CertificateError::ConfigError(format!(
                    "Invalid listen address {}:{}: {}",
                    self.server_host, self.server_port, e
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_defaults_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent");
        let config = AppConfig::load_from(missing.to_str().unwrap()).unwrap();

        assert_eq!(config.server_port, 3000);
        assert_eq!(config.ledger_url, "sqlite://certificates.db");
        assert_eq!(config.socket_addr().unwrap().port(), 3000);
    }

    #[test]
    fn test_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.toml");
        fs::write(
            &path,
            "server_port = 8080\nledger_url = \"sqlite://other.db\"\n",
        )
        .unwrap();

        let config = AppConfig::load_from(path.to_str().unwrap()).unwrap();
        assert_eq!(config.server_port, 8080);
        assert_eq!(config.ledger_url, "sqlite://other.db");
        assert_eq!(config.server_host, "0.0.0.0");
    }

    #[test]
    fn test_invalid_host_is_rejected() {
        let config = AppConfig {
            server_host: "not a host".to_string(),
            server_port: 3000,
            ledger_url: "sqlite::memory:".to_string(),
            log_filter: "info".to_string(),
        };
        assert!(matches!(config.validate(), Err(CertificateError::ConfigError(_))));
    }

    #[test]
    fn test_empty_ledger_url_is_rejected() {
        let config = AppConfig {
            server_host: "127.0.0.1".to_string(),
            server_port: 3000,
            ledger_url: " ".to_string(),
            log_filter: "info".to_string(),
        };
        assert!(config.validate().is_err());
    }
}
