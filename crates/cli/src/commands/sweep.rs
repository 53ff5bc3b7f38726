//! Scheduled expiry sweep.
//!
//! Runs the predicate-based bulk update once and exits; cron (or any
//! external scheduler) owns the cadence. The update is idempotent, so
//! overlapping runs are harmless.
//!
//! # Usage
//!
//! ```text
//! */15 * * * * subcart-cli sweep
//! ```

use chrono::Utc;

use subcart_cart::db::{self, CartStore, PgCartStore};

use super::CommandError;

/// Flip every overdue `PURCHASED` record to `EXPIRED`.
///
/// # Errors
///
/// Returns an error if the database is unreachable or the update fails.
pub async fn run() -> Result<(), CommandError> {
    let database_url = super::database_url()?;

    tracing::info!("Connecting to cart database...");
    let pool = db::create_pool(&database_url).await?;

    let store = PgCartStore::new(pool);
    let updated = store.expire_overdue(Utc::now()).await?;

    tracing::info!(updated, "Sweep complete");
    Ok(())
}
