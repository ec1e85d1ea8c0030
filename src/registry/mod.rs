//! Issuer Registry
//!
//! One admin address, fixed when the ledger is initialized, and the set of
//! addresses allowed to issue certificates. The admin is not an issuer
//! unless it adds itself.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, info};

use crate::crypto::Address;
use crate::error::CertificateError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssuerRegistry {
    admin: Address,
    issuers: BTreeSet<Address>,
}

impl IssuerRegistry {
    pub fn new(admin: Address) -> Self {
        Self {
            admin,
            issuers: BTreeSet::new(),
        }
    }

    pub fn admin(&self) -> &Address {
        &self.admin
    }

    /// Add `target` to the authorized set. Returns `true` if it was newly
    /// added; re-adding an existing issuer is a no-op.
    pub fn add_issuer(&mut self, caller: &Address, target: &Address) -> Result<bool, CertificateError> {
        ensure_admin(&self.admin, caller)?;

        let added = self.issuers.insert(target.clone());
        if added {
            info!("Authorized issuer {}", target);
        } else {
            debug!("Issuer {} already authorized", target);
        }
        Ok(added)
    }

    pub fn is_authorized(&self, address: &Address) -> bool {
        self.issuers.contains(address)
    }

    pub fn issuers(&self) -> impl Iterator<Item = &Address> {
        self.issuers.iter()
    }
}

/// Admin check shared by every ledger store
pub fn ensure_admin(admin: &Address, caller: &Address) -> Result<(), CertificateError> {
    if caller != admin {
        return Err(CertificateError::unauthorized(caller));
    }
    Ok(())
}
