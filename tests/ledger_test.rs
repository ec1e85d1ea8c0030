//! Certificate ledger protocol tests
//!
//! The same properties are checked against the in-memory store and the
//! SQLite store.

use std::sync::Arc;

use certificate_ledger::crypto::CallerKeypair;
use certificate_ledger::hashing::{fingerprint, CertificateFields};
use certificate_ledger::ledger::{CertificateLedger, InMemoryLedger, LedgerCall, SqliteLedger};
use certificate_ledger::verifier::{VerificationOutcome, Verifier};
use certificate_ledger::CertificateError;

mod common;
use common::*;

async fn check_issue_then_lookup(setup: TestLedger) {
    let hash = fingerprint("Alice", "CS101", "2024-01-01");
    assert_eq!(hash, fingerprint("Alice", "CS101", "2024-01-01"));

    let before = now_secs();
    setup
        .ledger
        .issue(&setup.issuer.address(), "CERT-1", &hash)
        .await
        .unwrap();

    let record = setup.ledger.lookup("CERT-1").await.unwrap().unwrap();
    assert_eq!(record.identifier, "CERT-1");
    assert_eq!(record.fingerprint, hash);
    assert_eq!(record.issuer, setup.issuer.address());
    assert!(record.issued_at >= before);

    assert_eq!(setup.ledger.lookup("CERT-2").await.unwrap(), None);
}

async fn check_unauthorized_issue(setup: TestLedger) {
    let outsider = CallerKeypair::generate();
    let hash = fingerprint("Alice", "CS101", "2024-01-01");

    let result = setup.ledger.issue(&outsider.address(), "CERT-1", &hash).await;
    assert!(matches!(result, Err(CertificateError::Unauthorized(who)) if who == outsider.address().to_string()));
    assert_eq!(setup.ledger.lookup("CERT-1").await.unwrap(), None);
}

async fn check_admin_is_not_issuer(setup: TestLedger) {
    let admin = setup.admin.address();
    assert_eq!(setup.ledger.admin().await.unwrap(), admin);
    assert!(!setup.ledger.is_authorized(&admin).await.unwrap());

    let hash = fingerprint("Alice", "CS101", "2024-01-01");
    let result = setup.ledger.issue(&admin, "CERT-ADMIN", &hash).await;
    assert!(matches!(result, Err(CertificateError::Unauthorized(_))));

    // Once added explicitly, the admin can issue like anyone else.
    setup.ledger.add_issuer(&admin, &admin).await.unwrap();
    setup.ledger.issue(&admin, "CERT-ADMIN", &hash).await.unwrap();
}

async fn check_duplicate_identifier(setup: TestLedger) {
    let original = fingerprint("Alice", "CS101", "2024-01-01");
    let forged = fingerprint("Alice", "CS101", "2024-06-01");

    setup
        .ledger
        .issue(&setup.issuer.address(), "CERT-1", &original)
        .await
        .unwrap();

    // Not even the original issuer may overwrite a record.
    let result = setup.ledger.issue(&setup.issuer.address(), "CERT-1", &forged).await;
    assert!(matches!(result, Err(CertificateError::DuplicateIdentifier(id)) if id == "CERT-1"));

    let record = setup.ledger.lookup("CERT-1").await.unwrap().unwrap();
    assert_eq!(record.fingerprint, original);
}

async fn check_concurrent_issue_single_winner(setup: TestLedger) {
    let second_issuer = CallerKeypair::generate();
    setup
        .ledger
        .add_issuer(&setup.admin.address(), &second_issuer.address())
        .await
        .unwrap();

    let mut handles = Vec::new();
    for i in 0..16 {
        let ledger = setup.ledger.clone();
        let caller = if i % 2 == 0 {
            setup.issuer.address()
        } else {
            second_issuer.address()
        };
        let hash = fingerprint(&format!("Student {}", i), "CS101", "2024-01-01");
        handles.push(tokio::spawn(async move {
            ledger.issue(&caller, "CERT-RACE", &hash).await
        }));
    }

    let mut winners = Vec::new();
    let mut duplicates = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(record) => winners.push(record),
            Err(CertificateError::DuplicateIdentifier(_)) => duplicates += 1,
            Err(other) => panic!("unexpected error: {}", other),
        }
    }

    assert_eq!(winners.len(), 1);
    assert_eq!(duplicates, 15);
    assert_eq!(setup.ledger.lookup("CERT-RACE").await.unwrap(), Some(winners.remove(0)));
}

async fn check_distinct_identifiers_independent(setup: TestLedger) {
    let mut handles = Vec::new();
    for i in 0..8 {
        let ledger = setup.ledger.clone();
        let caller = setup.issuer.address();
        handles.push(tokio::spawn(async move {
            let hash = fingerprint(&format!("Student {}", i), "CS101", "2024-01-01");
            ledger.issue(&caller, &format!("CERT-{}", i), &hash).await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }
    for i in 0..8 {
        assert!(setup.ledger.lookup(&format!("CERT-{}", i)).await.unwrap().is_some());
    }
}

#[tokio::test]
async fn test_memory_issue_then_lookup() {
    check_issue_then_lookup(setup_memory_ledger().await).await;
}

#[tokio::test]
async fn test_sqlite_issue_then_lookup() {
    let store = SqliteLedger::new_in_memory().await.unwrap();
    check_issue_then_lookup(setup_sqlite_ledger(store).await).await;
}

#[tokio::test]
async fn test_memory_unauthorized_issue() {
    check_unauthorized_issue(setup_memory_ledger().await).await;
}

#[tokio::test]
async fn test_sqlite_unauthorized_issue() {
    let store = SqliteLedger::new_in_memory().await.unwrap();
    check_unauthorized_issue(setup_sqlite_ledger(store).await).await;
}

#[tokio::test]
async fn test_memory_admin_is_not_issuer() {
    check_admin_is_not_issuer(setup_memory_ledger().await).await;
}

#[tokio::test]
async fn test_sqlite_admin_is_not_issuer() {
    let store = SqliteLedger::new_in_memory().await.unwrap();
    check_admin_is_not_issuer(setup_sqlite_ledger(store).await).await;
}

#[tokio::test]
async fn test_memory_duplicate_identifier() {
    check_duplicate_identifier(setup_memory_ledger().await).await;
}

#[tokio::test]
async fn test_sqlite_duplicate_identifier() {
    let store = SqliteLedger::new_in_memory().await.unwrap();
    check_duplicate_identifier(setup_sqlite_ledger(store).await).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_memory_concurrent_issue_single_winner() {
    check_concurrent_issue_single_winner(setup_memory_ledger().await).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_sqlite_file_concurrent_issue_single_winner() {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}", dir.path().join("ledger.db").display());
    let store = SqliteLedger::create(&url).await.unwrap();
    check_concurrent_issue_single_winner(setup_sqlite_ledger(store).await).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_memory_distinct_identifiers_independent() {
    check_distinct_identifiers_independent(setup_memory_ledger().await).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_sqlite_file_distinct_identifiers_independent() {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}", dir.path().join("ledger.db").display());
    let store = SqliteLedger::create(&url).await.unwrap();
    check_distinct_identifiers_independent(setup_sqlite_ledger(store).await).await;
}

#[tokio::test]
async fn test_sqlite_records_survive_reconnect() {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}", dir.path().join("ledger.db").display());
    let hash = fingerprint("Alice", "CS101", "2024-01-01");

    let issuer_address = {
        let setup = setup_sqlite_ledger(SqliteLedger::create(&url).await.unwrap()).await;
        setup
            .ledger
            .issue(&setup.issuer.address(), "CERT-1", &hash)
            .await
            .unwrap();
        setup.issuer.address()
    };

    let reopened = CertificateLedger::new(Arc::new(SqliteLedger::connect(&url).await.unwrap()));
    let record = reopened.lookup("CERT-1").await.unwrap().unwrap();
    assert_eq!(record.fingerprint, hash);
    assert_eq!(record.issuer, issuer_address);
    assert!(reopened.is_authorized(&issuer_address).await.unwrap());
}

#[tokio::test]
async fn test_signed_issuance_end_to_end() {
    let admin = CallerKeypair::generate();
    let issuer = CallerKeypair::generate();
    let store = SqliteLedger::new_in_memory().await.unwrap();
    store.initialize(&admin.address()).await.unwrap();
    let ledger = CertificateLedger::new(Arc::new(store));

    let add = LedgerCall::AddIssuer {
        target: issuer.address(),
    }
    .sign(&admin)
    .unwrap();
    ledger.execute(&add).await.unwrap();

    let fields = CertificateFields::new("Alice", "CS101", "2024-01-01");
    let issue = LedgerCall::Issue {
        identifier: "CERT-1".to_string(),
        fingerprint: fields.fingerprint(),
    }
    .sign(&issuer)
    .unwrap();
    ledger.execute(&issue).await.unwrap();

    // Replaying the same signed call cannot create a second record.
    assert!(matches!(
        ledger.execute(&issue).await,
        Err(CertificateError::DuplicateIdentifier(_))
    ));

    let verifier = Verifier::new(ledger);
    let outcome = verifier.verify("CERT-1", Some(&fields)).await.unwrap();
    assert!(outcome.is_valid());
    assert_eq!(outcome.record().unwrap().issuer, issuer.address());

    let tampered = CertificateFields::new("Alice", "CS101", "2024-01-02");
    assert!(matches!(
        verifier.verify("CERT-1", Some(&tampered)).await.unwrap(),
        VerificationOutcome::Mismatch { .. }
    ));
    assert!(verifier.verify("CERT-2", None).await.unwrap().is_absent());
}

#[tokio::test]
async fn test_transport_faults_propagate_from_reads() {
    let ledger = CertificateLedger::new(Arc::new(UnreachableLedger));
    let result = Verifier::new(ledger).verify("CERT-1", None).await;
    assert!(matches!(result, Err(e) if e.is_transient()));
}

#[tokio::test]
async fn test_memory_ledger_counts_only_successful_writes() {
    let admin = CallerKeypair::generate();
    let store = Arc::new(InMemoryLedger::new(admin.address()));
    let ledger = CertificateLedger::new(store.clone());
    ledger.add_issuer(&admin.address(), &admin.address()).await.unwrap();

    let hash = fingerprint("Alice", "CS101", "2024-01-01");
    ledger.issue(&admin.address(), "CERT-1", &hash).await.unwrap();
    assert!(matches!(
        ledger.issue(&admin.address(), "CERT-1", &hash).await,
        Err(CertificateError::DuplicateIdentifier(_))
    ));
    assert!(matches!(
        ledger.issue(&CallerKeypair::generate().address(), "CERT-2", &hash).await,
        Err(CertificateError::Unauthorized(_))
    ));

    assert_eq!(store.record_count().await, 1);
}

#[tokio::test]
async fn test_missing_ledger_is_a_fault_not_an_absence() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.db");
    let url = format!("sqlite://{}", path.display());

    let result = SqliteLedger::connect(&url).await;
    assert!(matches!(result, Err(CertificateError::TransportFault(_))));
    assert!(!path.exists());
}
