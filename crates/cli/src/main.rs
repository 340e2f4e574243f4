//! Operational command-line tool.
//!
//! Currently exposes one command:
//!
//! ```text
//! aegs-cli issue-certificates
//! ```
//!
//! Scans finished events for confirmed, attendance-confirmed enrollments
//! lacking a certificate and issues one each, printing the issued count.
//! Idempotent: re-running issues nothing new. Exit code 0 on success.

use anyhow::Context;
use chrono::Utc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use aegs_db::repositories::CertificateRepo;

fn print_usage() {
    eprintln!("Usage: aegs-cli <command>");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  issue-certificates   Issue certificates for eligible enrollments of finished events");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "aegs_cli=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let command = match std::env::args().nth(1) {
        Some(command) => command,
        None => {
            print_usage();
            anyhow::bail!("missing command");
        }
    };

    match command.as_str() {
        "issue-certificates" => issue_certificates().await,
        other => {
            print_usage();
            anyhow::bail!("unknown command: {other}");
        }
    }
}

/// Run the batch issuance routine once and report the issued count.
async fn issue_certificates() -> anyhow::Result<()> {
    let database_url =
        std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

    let pool = aegs_db::create_pool(&database_url)
        .await
        .context("Failed to connect to database")?;

    aegs_db::run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;

    let today = Utc::now().date_naive();
    let issued = CertificateRepo::issue_missing_for_finished_events(&pool, today)
        .await
        .context("Certificate issuance failed")?;

    tracing::info!(issued, "batch certificate issuance finished");
    println!("Issued {issued} certificate(s)");
    Ok(())
}
