use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tracing::error;

use certificate_ledger::config::AppConfig;
use certificate_ledger::hashing::CertificateFields;
use certificate_ledger::ledger::{CertificateLedger, SqliteLedger};
use certificate_ledger::verifier::{VerificationOutcome, Verifier};

#[derive(Parser)]
#[command(name = "cert-verify")]
#[command(about = "Check a certificate identifier against the ledger")]
struct Cli {
    /// Certificate identifier
    cert_id: String,

    /// Ledger database URL (defaults to the configured ledger_url)
    #[arg(long)]
    ledger: Option<String>,

    /// Recompute the hash from these fields and compare
    #[arg(long, requires_all = ["course", "date"])]
    name: Option<String>,
    #[arg(long, requires = "name")]
    course: Option<String>,
    #[arg(long, requires = "name")]
    date: Option<String>,

    /// Print the outcome as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::WARN)
        .init();

    let cli = Cli::parse();

    let fields = match (cli.name.clone(), cli.course.clone(), cli.date.clone()) {
        (Some(name), Some(course), Some(date)) => Some(CertificateFields::new(name, course, date)),
        _ => None,
    };

    // A ledger that cannot be read is not the same answer as "never issued"
    let outcome = match lookup(cli.ledger.clone(), &cli.cert_id, fields.as_ref()).await {
        Ok(outcome) => outcome,
        Err(e) => {
            error!("Ledger read failed: {:#}", e);
            std::process::exit(3);
        }
    };

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        print_outcome(&cli.cert_id, &outcome);
    }

    match outcome {
        VerificationOutcome::Absent => {
            error!("Certificate {} not found", cli.cert_id);
            std::process::exit(2);
        }
        VerificationOutcome::Mismatch { .. } => std::process::exit(1),
        VerificationOutcome::Present { .. } | VerificationOutcome::Match { .. } => Ok(()),
    }
}

async fn lookup(
    ledger_url: Option<String>,
    cert_id: &str,
    fields: Option<&CertificateFields>,
) -> Result<VerificationOutcome> {
    let url = match ledger_url {
        Some(url) => url,
        None => AppConfig::load()?.ledger_url,
    };
    let store = SqliteLedger::connect(&url)
        .await
        .with_context(|| format!("Failed to open ledger at {}", url))?;
    let verifier = Verifier::new(CertificateLedger::new(Arc::new(store)));
    Ok(verifier.verify(cert_id, fields).await?)
}

fn print_outcome(cert_id: &str, outcome: &VerificationOutcome) {
    let Some(record) = outcome.record() else {
        println!("Certificate {} not found", cert_id);
        return;
    };

    println!("Certificate ID: {}", record.identifier);
    println!("Hash:           {}", record.fingerprint);
    println!("Issuer:         {}", record.issuer);
    println!("Timestamp:      {}", record.issued_at);

    match outcome {
        VerificationOutcome::Match { .. } => println!("Result:         MATCH"),
        VerificationOutcome::Mismatch { computed, .. } => {
            println!("Result:         MISMATCH (fields hash to {})", computed)
        }
        _ => {}
    }
}
