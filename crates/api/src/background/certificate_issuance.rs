//! Periodic automatic certificate issuance.
//!
//! Spawns a loop that scans finished events for confirmed, attended
//! enrollments lacking a certificate and issues one each. The routine is
//! idempotent: the unique enrollment constraint on certificates means
//! re-runs (or a concurrently running CLI batch) never duplicate.
//! Runs on a fixed interval using `tokio::time::interval`.

use std::time::Duration;

use chrono::Utc;
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

use aegs_db::repositories::CertificateRepo;

/// How often the issuance job runs.
const ISSUANCE_INTERVAL: Duration = Duration::from_secs(3600); // 1 hour

/// Run the certificate issuance loop until `cancel` is triggered.
pub async fn run(pool: PgPool, cancel: CancellationToken) {
    tracing::info!(
        interval_secs = ISSUANCE_INTERVAL.as_secs(),
        "Certificate issuance job started"
    );

    let mut interval = tokio::time::interval(ISSUANCE_INTERVAL);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Certificate issuance job stopping");
                break;
            }
            _ = interval.tick() => {
                let today = Utc::now().date_naive();
                match CertificateRepo::issue_missing_for_finished_events(&pool, today).await {
                    Ok(issued) => {
                        if issued > 0 {
                            tracing::info!(issued, "Certificate issuance: issued new certificates");
                        } else {
                            tracing::debug!("Certificate issuance: nothing to issue");
                        }
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Certificate issuance: run failed");
                    }
                }
            }
        }
    }
}
