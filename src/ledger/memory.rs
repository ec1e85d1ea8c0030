//! In-process ledger
//!
//! Registry and records share one lock so that the authorization check and
//! the insert-if-absent happen in the same critical section.

use async_trait::async_trait;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

use super::record::CertificateRecord;
use super::store::LedgerStore;
use crate::crypto::Address;
use crate::error::CertificateError;
use crate::hashing::CertificateFingerprint;
use crate::registry::IssuerRegistry;

struct LedgerState {
    registry: IssuerRegistry,
    records: HashMap<String, CertificateRecord>,
}

pub struct InMemoryLedger {
    state: RwLock<LedgerState>,
}

impl InMemoryLedger {
    pub fn new(admin: Address) -> Self {
        Self {
            state: RwLock::new(LedgerState {
                registry: IssuerRegistry::new(admin),
                records: HashMap::new(),
            }),
        }
    }

    pub async fn record_count(&self) -> usize {
        self.state.read().await.records.len()
    }
}

#[async_trait]
impl LedgerStore for InMemoryLedger {
    async fn admin(&self) -> Result<Address, CertificateError> {
        Ok(self.state.read().await.registry.admin().clone())
    }

    async fn add_issuer(&self, caller: &Address, target: &Address) -> Result<bool, CertificateError> {
        self.state.write().await.registry.add_issuer(caller, target)
    }

    async fn is_authorized(&self, address: &Address) -> Result<bool, CertificateError> {
        Ok(self.state.read().await.registry.is_authorized(address))
    }

    async fn submit_record(
        &self,
        caller: &Address,
        identifier: &str,
        fingerprint: &CertificateFingerprint,
    ) -> Result<CertificateRecord, CertificateError> {
        let mut state = self.state.write().await;

        if !state.registry.is_authorized(caller) {
            return Err(CertificateError::unauthorized(caller));
        }

        let issued_at = self.current_time();
        match state.records.entry(identifier.to_string()) {
            Entry::Occupied(_) => Err(CertificateError::DuplicateIdentifier(identifier.to_string())),
            Entry::Vacant(slot) => {
                let record = CertificateRecord {
                    identifier: identifier.to_string(),
                    fingerprint: fingerprint.clone(),
                    issuer: caller.clone(),
                    issued_at,
                };
                slot.insert(record.clone());
                debug!("Stored record {}", record.summary());
                Ok(record)
            }
        }
    }

    async fn read_record(&self, identifier: &str) -> Result<Option<CertificateRecord>, CertificateError> {
        Ok(self.state.read().await.records.get(identifier).cloned())
    }
}
