#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::Arc;

use certificate_ledger::crypto::{Address, CallerKeypair};
use certificate_ledger::hashing::CertificateFingerprint;
use certificate_ledger::ledger::{
    CertificateLedger, CertificateRecord, InMemoryLedger, LedgerStore, SqliteLedger,
};
use certificate_ledger::CertificateError;

/// Admin plus one authorized issuer over a fresh in-memory ledger
pub struct TestLedger {
    pub ledger: CertificateLedger,
    pub admin: CallerKeypair,
    pub issuer: CallerKeypair,
}

pub async fn setup_memory_ledger() -> TestLedger {
    let admin = CallerKeypair::generate();
    let issuer = CallerKeypair::generate();
    let ledger = CertificateLedger::new(Arc::new(InMemoryLedger::new(admin.address())));
    ledger
        .add_issuer(&admin.address(), &issuer.address())
        .await
        .expect("admin can add issuer");

    TestLedger {
        ledger,
        admin,
        issuer,
    }
}

pub async fn setup_sqlite_ledger(store: SqliteLedger) -> TestLedger {
    let admin = CallerKeypair::generate();
    let issuer = CallerKeypair::generate();
    store
        .initialize(&admin.address())
        .await
        .expect("initialize ledger");

    let ledger = CertificateLedger::new(Arc::new(store));
    ledger
        .add_issuer(&admin.address(), &issuer.address())
        .await
        .expect("admin can add issuer");

    TestLedger {
        ledger,
        admin,
        issuer,
    }
}

pub fn now_secs() -> u64 {
    chrono::Utc::now().timestamp() as u64
}

/// Store whose every call fails as if the ledger node were unreachable
pub struct UnreachableLedger;

fn unreachable() -> CertificateError {
    CertificateError::TransportFault("connection refused by rpc.internal:8545".to_string())
}

#[async_trait]
impl LedgerStore for UnreachableLedger {
    async fn admin(&self) -> Result<Address, CertificateError> {
        Err(unreachable())
    }

    async fn add_issuer(&self, _caller: &Address, _target: &Address) -> Result<bool, CertificateError> {
        Err(unreachable())
    }

    async fn is_authorized(&self, _address: &Address) -> Result<bool, CertificateError> {
        Err(unreachable())
    }

    async fn submit_record(
        &self,
        _caller: &Address,
        _identifier: &str,
        _fingerprint: &CertificateFingerprint,
    ) -> Result<CertificateRecord, CertificateError> {
        Err(unreachable())
    }

    async fn read_record(&self, _identifier: &str) -> Result<Option<CertificateRecord>, CertificateError> {
        Err(unreachable())
    }
}
