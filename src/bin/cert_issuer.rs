//! Signing client for ledger writes
//!
//! Holds the caller's key file, signs ledger calls and submits them to the
//! ledger directly. The HTTP service never sees these keys.

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use certificate_ledger::config::AppConfig;
use certificate_ledger::crypto::{Address, CallerKeypair};
use certificate_ledger::hashing::{fingerprint, CertificateFingerprint};
use certificate_ledger::ledger::{CallOutcome, CertificateLedger, LedgerCall, SqliteLedger};

#[derive(Parser)]
#[command(name = "cert-issuer")]
#[command(about = "Sign and submit certificate ledger writes")]
struct Cli {
    /// Ledger database URL (defaults to the configured ledger_url)
    #[arg(long, global = true)]
    ledger: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a new caller key file
    GenerateKey {
        /// Output path for the secret key
        #[arg(short, long, default_value = "./keys/issuer.key")]
        output: PathBuf,
    },
    /// Print the address of a key file
    Address {
        #[arg(short, long)]
        key: PathBuf,
    },
    /// Compute a certificate hash without touching the ledger
    Hash {
        #[arg(long)]
        name: String,
        #[arg(long)]
        course: String,
        #[arg(long)]
        date: String,
    },
    /// Create the ledger database and set this key's address as admin
    Init {
        #[arg(short, long)]
        key: PathBuf,
    },
    /// Authorize an issuer address (admin key required)
    AddIssuer {
        #[arg(short, long)]
        key: PathBuf,
        /// Address to authorize
        #[arg(short, long)]
        target: String,
    },
    /// Anchor a certificate under an identifier
    Issue {
        #[arg(short, long)]
        key: PathBuf,
        /// Certificate identifier
        #[arg(long)]
        cert_id: String,
        /// Precomputed certificate hash; otherwise computed from the fields
        #[arg(long, conflicts_with_all = ["name", "course", "date"])]
        cert_hash: Option<String>,
        #[arg(long, requires_all = ["course", "date"])]
        name: Option<String>,
        #[arg(long)]
        course: Option<String>,
        #[arg(long)]
        date: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::GenerateKey { output } => {
            let keypair = CallerKeypair::generate();
            keypair.save(&output)?;
            println!("Address: {}", keypair.address());
            println!("Key written to {}", output.display());
        }
        Commands::Address { key } => {
            println!("{}", CallerKeypair::load(&key)?.address());
        }
        Commands::Hash { name, course, date } => {
            println!("{}", fingerprint(&name, &course, &date));
        }
        Commands::Init { key } => {
            let keypair = CallerKeypair::load(&key)?;
            let url = resolve_ledger_url(cli.ledger)?;
            let store = SqliteLedger::create(&url)
                .await
                .with_context(|| format!("Failed to create ledger at {}", url))?;
            let admin = store.initialize(&keypair.address()).await?;
            if admin != keypair.address() {
                return Err(anyhow!("Ledger already initialized with admin {}", admin));
            }
            println!("Ledger admin: {}", admin);
        }
        Commands::AddIssuer { key, target } => {
            let keypair = CallerKeypair::load(&key)?;
            let target = Address::parse(&target)?;
            let call = LedgerCall::AddIssuer { target }.sign(&keypair)?;
            let outcome = open_ledger(cli.ledger).await?.execute(&call).await?;
            report(&outcome);
        }
        Commands::Issue {
            key,
            cert_id,
            cert_hash,
            name,
            course,
            date,
        } => {
            let keypair = CallerKeypair::load(&key)?;
            let fingerprint = resolve_fingerprint(cert_hash, name, course, date)?;
            let call = LedgerCall::Issue {
                identifier: cert_id,
                fingerprint,
            }
            .sign(&keypair)?;
            let outcome = open_ledger(cli.ledger).await?.execute(&call).await?;
            report(&outcome);
        }
    }

    Ok(())
}

fn resolve_ledger_url(ledger_url: Option<String>) -> Result<String> {
    match ledger_url {
        Some(url) => Ok(url),
        None => Ok(AppConfig::load()?.ledger_url),
    }
}

/// Writes other than `init` go to an existing ledger only
async fn open_ledger(ledger_url: Option<String>) -> Result<CertificateLedger> {
    let url = resolve_ledger_url(ledger_url)?;
    let store = SqliteLedger::connect(&url)
        .await
        .with_context(|| format!("Failed to open ledger at {} (run `cert-issuer init` first)", url))?;
    Ok(CertificateLedger::new(Arc::new(store)))
}

fn resolve_fingerprint(
    cert_hash: Option<String>,
    name: Option<String>,
    course: Option<String>,
    date: Option<String>,
) -> Result<CertificateFingerprint> {
    if let Some(hash) = cert_hash {
        return Ok(CertificateFingerprint::parse(&hash)?);
    }
    match (name, course, date) {
        (Some(name), Some(course), Some(date)) => Ok(fingerprint(&name, &course, &date)),
        _ => Err(anyhow!("Provide either --cert-hash or all of --name, --course and --date")),
    }
}

fn report(outcome: &CallOutcome) {
    match outcome {
        CallOutcome::IssuerAdded {
            target,
            newly_added: true,
        } => println!("Authorized issuer {}", target),
        CallOutcome::IssuerAdded {
            target,
            newly_added: false,
        } => println!("{} was already an issuer", target),
        CallOutcome::Issued { record } => {
            println!("Certificate issued");
            println!("  Certificate ID: {}", record.identifier);
            println!("  Hash:           {}", record.fingerprint);
            println!("  Issuer:         {}", record.issuer);
            println!("  Timestamp:      {}", record.issued_at);
        }
    }
}
