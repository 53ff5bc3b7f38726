//! Persistence port and `PostgreSQL` adapter for cart records.
//!
//! # Database: `subcart`
//!
//! One table, `cart_item`, holds both cart items and subscriptions
//! (state-tagged). A partial unique index scoped to `IN_PROGRESS` enforces
//! the one-record-per-(user, service) cart invariant.
//!
//! The engine receives the store as an injected [`CartStore`] trait object;
//! the pool is built once at the process entry point and owned there. The
//! in-memory implementation backing the unit tests lives in
//! `crate::testing`.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/cart/migrations/` and run via:
//! ```bash
//! cargo run -p subcart-cli -- migrate
//! ```

pub mod cart_items;

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use subcart_core::{CartItemId, CartState, PlanType, ServiceId, UserId};

use crate::models::CartItem;

pub use cart_items::PgCartStore;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested record was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., the IN_PROGRESS uniqueness index).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Persistence operations the cart engine depends on.
///
/// Time is always passed in by the caller so implementations stay
/// deterministic; date-based queries ("active", "overdue") compare against
/// the given instant, never their own clock.
#[async_trait]
pub trait CartStore: Send + Sync {
    /// Insert a fresh record.
    ///
    /// Returns [`RepositoryError::Conflict`] when an `IN_PROGRESS` record
    /// for the same (user, service) already exists.
    async fn insert(&self, item: &CartItem) -> Result<CartItem, RepositoryError>;

    /// Point lookup by ID.
    async fn find_by_id(&self, id: CartItemId) -> Result<Option<CartItem>, RepositoryError>;

    /// All records for a user in the given state.
    async fn find_by_user_and_state(
        &self,
        user_id: &UserId,
        state: CartState,
    ) -> Result<Vec<CartItem>, RepositoryError>;

    /// The user's `IN_PROGRESS` record for a service, if any.
    async fn find_in_progress(
        &self,
        user_id: &UserId,
        service_id: &ServiceId,
    ) -> Result<Option<CartItem>, RepositoryError>;

    /// Overwrite plan and price of an `IN_PROGRESS` record in place.
    ///
    /// Returns [`RepositoryError::NotFound`] if the record is gone or has
    /// already left the cart.
    async fn update_plan(
        &self,
        id: CartItemId,
        plan_type: PlanType,
        price: Decimal,
    ) -> Result<CartItem, RepositoryError>;

    /// Transition a record to `PURCHASED` with the given timestamps.
    async fn mark_purchased(
        &self,
        id: CartItemId,
        purchased_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Result<CartItem, RepositoryError>;

    /// Delete by ID. Returns `true` if a record was deleted.
    async fn delete(&self, id: CartItemId) -> Result<bool, RepositoryError>;

    /// Count of the user's records in the given state.
    async fn count_by_user_and_state(
        &self,
        user_id: &UserId,
        state: CartState,
    ) -> Result<i64, RepositoryError>;

    /// Purchased records that are still active at `now`, newest purchase
    /// first.
    async fn active_subscriptions(
        &self,
        user_id: &UserId,
        now: DateTime<Utc>,
    ) -> Result<Vec<CartItem>, RepositoryError>;

    /// All purchased and expired records, newest purchase first.
    async fn all_subscriptions(&self, user_id: &UserId) -> Result<Vec<CartItem>, RepositoryError>;

    /// Count of purchased records still active at `now`.
    async fn count_active_subscriptions(
        &self,
        user_id: &UserId,
        now: DateTime<Utc>,
    ) -> Result<i64, RepositoryError>;

    /// Whether the user holds an active subscription for the service at
    /// `now` (date-based, independent of the sweep).
    async fn has_active_access(
        &self,
        user_id: &UserId,
        service_id: &ServiceId,
        now: DateTime<Utc>,
    ) -> Result<bool, RepositoryError>;

    /// Flip every `PURCHASED` record with `expires_at` before `now` to
    /// `EXPIRED`. Returns the number of records changed.
    async fn expire_overdue(&self, now: DateTime<Utc>) -> Result<u64, RepositoryError>;

    /// Exact-decimal sum of `purchase_price` over the user's purchased and
    /// expired records.
    async fn total_spent(&self, user_id: &UserId) -> Result<Decimal, RepositoryError>;
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
