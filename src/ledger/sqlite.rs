//! SQLite-backed ledger
//!
//! Write-once semantics come from the `cert_id` primary key: inserts use
//! `ON CONFLICT DO NOTHING`, and a zero row count means another writer got
//! there first.

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use std::str::FromStr;
use tracing::{debug, info, warn};

use super::record::CertificateRecord;
use super::store::LedgerStore;
use crate::crypto::Address;
use crate::error::CertificateError;
use crate::hashing::CertificateFingerprint;
use crate::registry::ensure_admin;

pub const LEDGER_SCHEMA: &str = include_str!("../../migrations/001_certificate_ledger.sql");

#[derive(Clone)]
pub struct SqliteLedger {
    pool: SqlitePool,
}

impl SqliteLedger {
    /// Open an existing ledger database. A missing file is an error, so a
    /// mistyped path never reads as an empty ledger.
    pub async fn connect(database_url: &str) -> Result<Self, CertificateError> {
        let ledger = Self::open(database_url, false).await?;
        debug!("Opened ledger database at {}", database_url);
        Ok(ledger)
    }

    /// Create the database at `database_url` if needed and apply the schema
    pub async fn create(database_url: &str) -> Result<Self, CertificateError> {
        let ledger = Self::open(database_url, true).await?;
        ledger.run_migrations().await?;
        info!("Ledger database ready at {}", database_url);
        Ok(ledger)
    }

    async fn open(database_url: &str, create_if_missing: bool) -> Result<Self, CertificateError> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(create_if_missing)
            .journal_mode(SqliteJournalMode::Wal);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;
        Ok(Self { pool })
    }

    /// Private in-memory database. The database lives only as long as its
    /// single connection, so the pool must never reap it.
    pub async fn new_in_memory() -> Result<Self, CertificateError> {
        let pool = SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;

        let ledger = Self { pool };
        ledger.run_migrations().await?;
        Ok(ledger)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn run_migrations(&self) -> Result<(), CertificateError> {
        for statement in LEDGER_SCHEMA.split(';') {
            if statement.trim().is_empty() {
                continue;
            }
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }

    /// Fix the ledger admin. The first call wins; later calls leave the
    /// stored admin untouched and return it.
    pub async fn initialize(&self, admin: &Address) -> Result<Address, CertificateError> {
        let result = sqlx::query(
            r#"
            INSERT INTO ledger_admin (id, address, initialized_at)
            VALUES (1, ?, ?)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(admin.as_str())
        .bind(self.current_time() as i64)
        .execute(&self.pool)
        .await?;

        let stored = self.admin().await?;
        if result.rows_affected() == 1 {
            info!("Initialized ledger with admin {}", stored);
        } else if &stored != admin {
            warn!("Ledger already initialized with admin {}; ignoring {}", stored, admin);
        }
        Ok(stored)
    }
}

#[async_trait]
impl LedgerStore for SqliteLedger {
    async fn admin(&self) -> Result<Address, CertificateError> {
        let row = sqlx::query("SELECT address FROM ledger_admin WHERE id = 1")
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Address::parse(&row.try_get::<String, _>("address")?),
            None => Err(CertificateError::TransportFault(
                "Ledger has not been initialized with an admin".to_string(),
            )),
        }
    }

    async fn add_issuer(&self, caller: &Address, target: &Address) -> Result<bool, CertificateError> {
        let admin = self.admin().await?;
        ensure_admin(&admin, caller)?;

        let result = sqlx::query(
            r#"
            INSERT INTO authorized_issuers (address, added_by, added_at)
            VALUES (?, ?, ?)
            ON CONFLICT (address) DO NOTHING
            "#,
        )
        .bind(target.as_str())
        .bind(caller.as_str())
        .bind(self.current_time() as i64)
        .execute(&self.pool)
        .await?;

        let added = result.rows_affected() == 1;
        if added {
            info!("Authorized issuer {}", target);
        } else {
            debug!("Issuer {} already authorized", target);
        }
        Ok(added)
    }

    async fn is_authorized(&self, address: &Address) -> Result<bool, CertificateError> {
        let row = sqlx::query("SELECT 1 FROM authorized_issuers WHERE address = ?")
            .bind(address.as_str())
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }

    async fn submit_record(
        &self,
        caller: &Address,
        identifier: &str,
        fingerprint: &CertificateFingerprint,
    ) -> Result<CertificateRecord, CertificateError> {
        // Authorization is checked inside the insert itself.
        let issued_at = self.current_time();
        let result = sqlx::query(
            r#"
            INSERT INTO certificates (cert_id, cert_hash, issuer, issued_at)
            SELECT ?, ?, ?, ?
            WHERE EXISTS (SELECT 1 FROM authorized_issuers WHERE address = ?)
            ON CONFLICT (cert_id) DO NOTHING
            "#,
        )
        .bind(identifier)
        .bind(fingerprint.as_str())
        .bind(caller.as_str())
        .bind(issued_at as i64)
        .bind(caller.as_str())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            // Issuers are never removed, so a caller unauthorized now was
            // unauthorized at insert time.
            if !self.is_authorized(caller).await? {
                return Err(CertificateError::unauthorized(caller));
            }
            return Err(CertificateError::DuplicateIdentifier(identifier.to_string()));
        }

        Ok(CertificateRecord {
            identifier: identifier.to_string(),
            fingerprint: fingerprint.clone(),
            issuer: caller.clone(),
            issued_at,
        })
    }

    async fn read_record(&self, identifier: &str) -> Result<Option<CertificateRecord>, CertificateError> {
        let row = sqlx::query(
            r#"
            SELECT cert_id, cert_hash, issuer, issued_at
            FROM certificates
            WHERE cert_id = ?
            "#,
        )
        .bind(identifier)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        Ok(Some(CertificateRecord {
            identifier: row.try_get::<String, _>("cert_id")?,
            fingerprint: CertificateFingerprint::parse(&row.try_get::<String, _>("cert_hash")?)?,
            issuer: Address::parse(&row.try_get::<String, _>("issuer")?)?,
            issued_at: row.try_get::<i64, _>("issued_at")?.max(0) as u64,
        }))
    }
}
