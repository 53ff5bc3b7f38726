//! `PostgreSQL` implementation of the cart store.
//!
//! Runtime queries throughout (no sqlx offline cache requirements); rows
//! come back as [`CartItemRow`] and are parsed into the domain model at
//! this boundary, with enum strings validated via `FromStr`.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use subcart_core::{CartItemId, CartState, PlanType, ServiceId, UserId};

use super::{CartStore, RepositoryError};
use crate::models::CartItem;

/// Columns selected for every record-returning query.
const CART_ITEM_COLUMNS: &str = "id, user_id, service_id, state, plan_type, \
     added_at, purchased_at, expires_at, purchase_price";

/// Raw `cart_item` row as stored.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct CartItemRow {
    pub id: Uuid,
    pub user_id: String,
    pub service_id: String,
    pub state: String,
    pub plan_type: String,
    pub added_at: DateTime<Utc>,
    pub purchased_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    pub purchase_price: Decimal,
}

impl TryFrom<CartItemRow> for CartItem {
    type Error = RepositoryError;

    fn try_from(row: CartItemRow) -> Result<Self, Self::Error> {
        let state = CartState::from_str(&row.state)
            .map_err(|e| RepositoryError::DataCorruption(format!("invalid state in database: {e}")))?;
        let plan_type = PlanType::from_str(&row.plan_type).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid plan type in database: {e}"))
        })?;

        Ok(Self {
            id: CartItemId::new(row.id),
            user_id: UserId::new(row.user_id),
            service_id: ServiceId::new(row.service_id),
            state,
            plan_type,
            added_at: row.added_at,
            purchased_at: row.purchased_at,
            expires_at: row.expires_at,
            purchase_price: row.purchase_price,
        })
    }
}

/// `PostgreSQL`-backed cart store.
///
/// Clones share the underlying pool.
#[derive(Clone)]
pub struct PgCartStore {
    pool: PgPool,
}

impl PgCartStore {
    /// Create a new store over an existing pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CartStore for PgCartStore {
    #[instrument(skip(self, item), fields(item_id = %item.id))]
    async fn insert(&self, item: &CartItem) -> Result<CartItem, RepositoryError> {
        let row = sqlx::query_as::<_, CartItemRow>(&format!(
            "INSERT INTO cart_item \
                 (id, user_id, service_id, state, plan_type, added_at, \
                  purchased_at, expires_at, purchase_price) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING {CART_ITEM_COLUMNS}"
        ))
        .bind(item.id.as_uuid())
        .bind(item.user_id.as_str())
        .bind(item.service_id.as_str())
        .bind(item.state.as_str())
        .bind(item.plan_type.as_str())
        .bind(item.added_at)
        .bind(item.purchased_at)
        .bind(item.expires_at)
        .bind(item.purchase_price)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict(
                    "cart already holds an in-progress record for this service".to_owned(),
                );
            }
            RepositoryError::Database(e)
        })?;

        row.try_into()
    }

    async fn find_by_id(&self, id: CartItemId) -> Result<Option<CartItem>, RepositoryError> {
        let row = sqlx::query_as::<_, CartItemRow>(&format!(
            "SELECT {CART_ITEM_COLUMNS} FROM cart_item WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn find_by_user_and_state(
        &self,
        user_id: &UserId,
        state: CartState,
    ) -> Result<Vec<CartItem>, RepositoryError> {
        let rows = sqlx::query_as::<_, CartItemRow>(&format!(
            "SELECT {CART_ITEM_COLUMNS} FROM cart_item \
             WHERE user_id = $1 AND state = $2 \
             ORDER BY added_at ASC"
        ))
        .bind(user_id.as_str())
        .bind(state.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn find_in_progress(
        &self,
        user_id: &UserId,
        service_id: &ServiceId,
    ) -> Result<Option<CartItem>, RepositoryError> {
        let row = sqlx::query_as::<_, CartItemRow>(&format!(
            "SELECT {CART_ITEM_COLUMNS} FROM cart_item \
             WHERE user_id = $1 AND service_id = $2 AND state = 'IN_PROGRESS'"
        ))
        .bind(user_id.as_str())
        .bind(service_id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    #[instrument(skip(self), fields(item_id = %id))]
    async fn update_plan(
        &self,
        id: CartItemId,
        plan_type: PlanType,
        price: Decimal,
    ) -> Result<CartItem, RepositoryError> {
        let row = sqlx::query_as::<_, CartItemRow>(&format!(
            "UPDATE cart_item \
             SET plan_type = $2, purchase_price = $3, updated_at = now() \
             WHERE id = $1 AND state = 'IN_PROGRESS' \
             RETURNING {CART_ITEM_COLUMNS}"
        ))
        .bind(id.as_uuid())
        .bind(plan_type.as_str())
        .bind(price)
        .fetch_optional(&self.pool)
        .await?;

        row.ok_or(RepositoryError::NotFound)?.try_into()
    }

    #[instrument(skip(self), fields(item_id = %id))]
    async fn mark_purchased(
        &self,
        id: CartItemId,
        purchased_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Result<CartItem, RepositoryError> {
        let row = sqlx::query_as::<_, CartItemRow>(&format!(
            "UPDATE cart_item \
             SET state = 'PURCHASED', purchased_at = $2, expires_at = $3, updated_at = now() \
             WHERE id = $1 AND state = 'IN_PROGRESS' \
             RETURNING {CART_ITEM_COLUMNS}"
        ))
        .bind(id.as_uuid())
        .bind(purchased_at)
        .bind(expires_at)
        .fetch_optional(&self.pool)
        .await?;

        row.ok_or(RepositoryError::NotFound)?.try_into()
    }

    async fn delete(&self, id: CartItemId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM cart_item WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn count_by_user_and_state(
        &self,
        user_id: &UserId,
        state: CartState,
    ) -> Result<i64, RepositoryError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM cart_item WHERE user_id = $1 AND state = $2",
        )
        .bind(user_id.as_str())
        .bind(state.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    async fn active_subscriptions(
        &self,
        user_id: &UserId,
        now: DateTime<Utc>,
    ) -> Result<Vec<CartItem>, RepositoryError> {
        let rows = sqlx::query_as::<_, CartItemRow>(&format!(
            "SELECT {CART_ITEM_COLUMNS} FROM cart_item \
             WHERE user_id = $1 AND state = 'PURCHASED' AND expires_at > $2 \
             ORDER BY purchased_at DESC"
        ))
        .bind(user_id.as_str())
        .bind(now)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn all_subscriptions(&self, user_id: &UserId) -> Result<Vec<CartItem>, RepositoryError> {
        let rows = sqlx::query_as::<_, CartItemRow>(&format!(
            "SELECT {CART_ITEM_COLUMNS} FROM cart_item \
             WHERE user_id = $1 AND state IN ('PURCHASED', 'EXPIRED') \
             ORDER BY purchased_at DESC"
        ))
        .bind(user_id.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn count_active_subscriptions(
        &self,
        user_id: &UserId,
        now: DateTime<Utc>,
    ) -> Result<i64, RepositoryError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM cart_item \
             WHERE user_id = $1 AND state = 'PURCHASED' AND expires_at > $2",
        )
        .bind(user_id.as_str())
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    async fn has_active_access(
        &self,
        user_id: &UserId,
        service_id: &ServiceId,
        now: DateTime<Utc>,
    ) -> Result<bool, RepositoryError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS ( \
                 SELECT 1 FROM cart_item \
                 WHERE user_id = $1 AND service_id = $2 \
                   AND state = 'PURCHASED' AND expires_at > $3 \
             )",
        )
        .bind(user_id.as_str())
        .bind(service_id.as_str())
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    #[instrument(skip(self))]
    async fn expire_overdue(&self, now: DateTime<Utc>) -> Result<u64, RepositoryError> {
        // Predicate-based single statement: idempotent and safe under
        // concurrent invocation.
        let result = sqlx::query(
            "UPDATE cart_item \
             SET state = 'EXPIRED', updated_at = now() \
             WHERE state = 'PURCHASED' AND expires_at < $1",
        )
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn total_spent(&self, user_id: &UserId) -> Result<Decimal, RepositoryError> {
        let total = sqlx::query_scalar::<_, Option<Decimal>>(
            "SELECT SUM(purchase_price) FROM cart_item \
             WHERE user_id = $1 AND state IN ('PURCHASED', 'EXPIRED')",
        )
        .bind(user_id.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(total.unwrap_or_default())
    }
}
