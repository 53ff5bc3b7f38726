//! Database migration command.
//!
//! Migration files live in `crates/cart/migrations/` and are embedded at
//! compile time.
//!
//! # Environment Variables
//!
//! - `CART_DATABASE_URL` - `PostgreSQL` connection string (falls back to
//!   `DATABASE_URL`)

use subcart_cart::db;

use super::CommandError;

/// Run cart database migrations.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), CommandError> {
    let database_url = super::database_url()?;

    tracing::info!("Connecting to cart database...");
    let pool = db::create_pool(&database_url).await?;

    tracing::info!("Running cart migrations...");
    sqlx::migrate!("../cart/migrations").run(&pool).await?;

    tracing::info!("Cart migrations complete!");
    Ok(())
}
