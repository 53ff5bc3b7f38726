//! The cart/subscription engine.
//!
//! Owns the record lifecycle: items enter the cart `IN_PROGRESS`, move to
//! `PURCHASED` at checkout (gaining `purchased_at`/`expires_at`), and are
//! flipped to `EXPIRED` by the sweep once the expiry passes. Prices come
//! from the catalog collaborator at add time and are frozen on the record.
//!
//! All date-based views (active subscriptions, access checks) compare
//! `expires_at` against the current instant instead of trusting the stored
//! state, so a subscription stops granting access the moment it expires
//! even if the sweep has not run yet.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::instrument;

use subcart_core::{CartItemId, CartState, PlanType, ServiceId, ServiceSummary, UserId};

use crate::clients::{CatalogClient, IdentityClient};
use crate::db::{CartStore, RepositoryError};
use crate::error::{AppError, Result};
use crate::models::{CartItem, EnrichedCartItem};

/// A user's cart: enriched items plus exact-decimal totals.
#[derive(Debug, Clone, Serialize)]
pub struct CartContents {
    pub items: Vec<EnrichedCartItem>,
    pub total: Decimal,
    pub total_items: usize,
}

/// Per-user counters for the stats endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct UserStatistics {
    pub items_in_cart: i64,
    pub active_subscriptions: i64,
    pub expired_subscriptions: i64,
    pub total_spent: Decimal,
}

/// The cart/subscription engine.
///
/// Stateless apart from its injected collaborators; cheap to clone.
#[derive(Clone)]
pub struct CartEngine {
    store: Arc<dyn CartStore>,
    catalog: Arc<dyn CatalogClient>,
    identity: Arc<dyn IdentityClient>,
}

impl CartEngine {
    /// Create a new engine over the injected store and collaborator clients.
    #[must_use]
    pub fn new(
        store: Arc<dyn CartStore>,
        catalog: Arc<dyn CatalogClient>,
        identity: Arc<dyn IdentityClient>,
    ) -> Self {
        Self {
            store,
            catalog,
            identity,
        }
    }

    /// Add a service to the user's cart, or change the plan of the item
    /// already there.
    ///
    /// The catalog is consulted for the service's existence, availability,
    /// and the price of the requested plan; the resolved price is frozen on
    /// the record. Re-adding a service that is already `IN_PROGRESS`
    /// overwrites plan and price in place rather than creating a duplicate.
    ///
    /// # Errors
    ///
    /// - [`AppError::NotFound`] if the catalog has no such service
    /// - [`AppError::ServiceUnavailable`] if the service is inactive
    /// - [`AppError::InvalidPrice`] if the plan's price is absent or
    ///   non-positive
    /// - [`AppError::Catalog`] if the catalog cannot be reached
    #[instrument(skip(self), fields(user_id = %user_id, service_id = %service_id))]
    pub async fn add_to_cart(
        &self,
        user_id: &UserId,
        service_id: &ServiceId,
        plan_type: PlanType,
    ) -> Result<CartItem> {
        let service = self
            .catalog
            .get_service(service_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("service {service_id} not found")))?;

        if !service.active {
            return Err(AppError::ServiceUnavailable(format!(
                "service {service_id} is not available"
            )));
        }

        let price = plan_price(&service, plan_type)?;

        if let Some(existing) = self.store.find_in_progress(user_id, service_id).await? {
            let updated = self.store.update_plan(existing.id, plan_type, price).await?;
            return Ok(updated);
        }

        let item = CartItem::new(
            user_id.clone(),
            service_id.clone(),
            plan_type,
            price,
            Utc::now(),
        );

        match self.store.insert(&item).await {
            Ok(created) => Ok(created),
            // A concurrent add for the same (user, service) won the insert
            // race; the unique index turned ours into a conflict. Treat it
            // as "already exists" and update in place.
            Err(RepositoryError::Conflict(_)) => {
                let existing = self
                    .store
                    .find_in_progress(user_id, service_id)
                    .await?
                    .ok_or_else(|| {
                        AppError::Internal(
                            "in-progress record disappeared after unique conflict".to_owned(),
                        )
                    })?;
                let updated = self.store.update_plan(existing.id, plan_type, price).await?;
                Ok(updated)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// The user's current cart with enriched items and exact totals.
    ///
    /// Enrichment is best-effort: collaborator failures leave the optional
    /// snapshot fields absent and never fail the call.
    #[instrument(skip(self, token), fields(user_id = %user_id))]
    pub async fn get_cart(&self, user_id: &UserId, token: &str) -> Result<CartContents> {
        let items = self
            .store
            .find_by_user_and_state(user_id, CartState::InProgress)
            .await?;

        let total: Decimal = items.iter().map(|i| i.purchase_price).sum();
        let total_items = items.len();
        let items = self.enrich(items, token).await;

        Ok(CartContents {
            items,
            total,
            total_items,
        })
    }

    /// Remove an `IN_PROGRESS` item from the cart.
    ///
    /// # Errors
    ///
    /// - [`AppError::NotFound`] if no such record exists
    /// - [`AppError::Forbidden`] if the record belongs to another user
    /// - [`AppError::InvalidState`] if the record has already been purchased
    #[instrument(skip(self), fields(item_id = %item_id, user_id = %user_id))]
    pub async fn remove_from_cart(&self, item_id: CartItemId, user_id: &UserId) -> Result<()> {
        let item = self
            .store
            .find_by_id(item_id)
            .await?
            .ok_or_else(|| AppError::NotFound("cart item not found".to_owned()))?;

        if item.user_id != *user_id {
            return Err(AppError::Forbidden(
                "cart item belongs to another user".to_owned(),
            ));
        }

        if !item.is_in_progress() {
            return Err(AppError::InvalidState(
                "only in-progress items can be removed".to_owned(),
            ));
        }

        if !self.store.delete(item_id).await? {
            return Err(AppError::NotFound("cart item not found".to_owned()));
        }

        Ok(())
    }

    /// Purchase everything in the user's cart.
    ///
    /// Each record transitions to `PURCHASED` with `purchased_at` set to
    /// the checkout instant and `expires_at` derived from the plan in
    /// calendar terms. Records persist one by one - there is no
    /// cross-record transaction, so a crash mid-loop leaves the earlier
    /// items purchased and the rest in the cart, which is safe to retry.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::EmptyCart`] when nothing is `IN_PROGRESS`.
    #[instrument(skip(self, token), fields(user_id = %user_id))]
    pub async fn checkout(&self, user_id: &UserId, token: &str) -> Result<Vec<EnrichedCartItem>> {
        let items = self
            .store
            .find_by_user_and_state(user_id, CartState::InProgress)
            .await?;

        if items.is_empty() {
            return Err(AppError::EmptyCart);
        }

        let now = Utc::now();
        let mut purchased = Vec::with_capacity(items.len());
        for item in items {
            let expires_at = item.plan_type.expires_after(now);
            let updated = self.store.mark_purchased(item.id, now, expires_at).await?;
            purchased.push(updated);
        }

        tracing::info!(count = purchased.len(), "Checkout completed");

        Ok(self.enrich(purchased, token).await)
    }

    /// The user's subscriptions, newest purchase first.
    ///
    /// With `include_expired` false, only records that are `PURCHASED` and
    /// whose `expires_at` is still in the future are returned - a record
    /// the sweep has not flipped yet is excluded by date alone. With
    /// `include_expired` true, all `PURCHASED` and `EXPIRED` records are
    /// returned.
    #[instrument(skip(self), fields(user_id = %user_id, include_expired))]
    pub async fn subscriptions(
        &self,
        user_id: &UserId,
        include_expired: bool,
    ) -> Result<Vec<CartItem>> {
        let subscriptions = if include_expired {
            self.store.all_subscriptions(user_id).await?
        } else {
            self.store.active_subscriptions(user_id, Utc::now()).await?
        };

        Ok(subscriptions)
    }

    /// Whether the user currently holds access to the service.
    ///
    /// Date-based: true iff a `PURCHASED` record exists with `expires_at`
    /// in the future, independent of whether the sweep has run.
    #[instrument(skip(self), fields(user_id = %user_id, service_id = %service_id))]
    pub async fn check_access(&self, user_id: &UserId, service_id: &ServiceId) -> Result<bool> {
        let has_access = self
            .store
            .has_active_access(user_id, service_id, Utc::now())
            .await?;

        Ok(has_access)
    }

    /// Flip every overdue `PURCHASED` record to `EXPIRED`.
    ///
    /// Idempotent predicate-based update; safe to run repeatedly and
    /// concurrently. Returns the number of records changed.
    #[instrument(skip(self))]
    pub async fn sweep_expired(&self) -> Result<u64> {
        let updated = self.store.expire_overdue(Utc::now()).await?;

        if updated > 0 {
            tracing::info!(updated, "Expired overdue subscriptions");
        }

        Ok(updated)
    }

    /// Per-user counters: cart size, active/expired subscriptions, and the
    /// exact-decimal total spent across all purchases.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn statistics(&self, user_id: &UserId) -> Result<UserStatistics> {
        let now = Utc::now();

        let items_in_cart = self
            .store
            .count_by_user_and_state(user_id, CartState::InProgress)
            .await?;
        let active_subscriptions = self.store.count_active_subscriptions(user_id, now).await?;
        let expired_subscriptions = self
            .store
            .count_by_user_and_state(user_id, CartState::Expired)
            .await?;
        let total_spent = self.store.total_spent(user_id).await?;

        Ok(UserStatistics {
            items_in_cart,
            active_subscriptions,
            expired_subscriptions,
            total_spent,
        })
    }

    /// Decorate records with collaborator snapshots, best-effort.
    async fn enrich(&self, items: Vec<CartItem>, token: &str) -> Vec<EnrichedCartItem> {
        let mut enriched = Vec::with_capacity(items.len());

        for item in items {
            let service = match self.catalog.get_service(&item.service_id).await {
                Ok(service) => service,
                Err(e) => {
                    tracing::warn!(service_id = %item.service_id, error = %e, "Service enrichment failed");
                    None
                }
            };

            let user = match self.identity.get_user(&item.user_id, token).await {
                Ok(user) => user,
                Err(e) => {
                    tracing::warn!(user_id = %item.user_id, error = %e, "User enrichment failed");
                    None
                }
            };

            enriched.push(EnrichedCartItem {
                item,
                service,
                user,
            });
        }

        enriched
    }
}

/// Resolve the price the catalog quotes for the requested plan.
fn plan_price(service: &ServiceSummary, plan_type: PlanType) -> Result<Decimal> {
    let price = match plan_type {
        PlanType::Monthly => service.price_per_month,
        PlanType::Quarterly => service.price_per_quarter,
        PlanType::Yearly => service.price_per_year,
    };

    let price = price.ok_or_else(|| {
        AppError::InvalidPrice(format!("no {plan_type} price for service {}", service.id))
    })?;

    if price <= Decimal::ZERO {
        return Err(AppError::InvalidPrice(format!(
            "non-positive {plan_type} price for service {}",
            service.id
        )));
    }

    Ok(price)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::str::FromStr;

    use chrono::{Duration, Months};

    use crate::testing::{StubCatalog, StubIdentity, active_service, engine_with};

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[tokio::test]
    async fn test_add_to_cart_creates_in_progress_record_with_plan_price() {
        let (engine, _store) = engine_with(
            StubCatalog::with_service(active_service("svc-1", "100.00")),
            StubIdentity::empty(),
        );

        let item = engine
            .add_to_cart(&UserId::new("u-1"), &ServiceId::new("svc-1"), PlanType::Monthly)
            .await
            .unwrap();

        assert_eq!(item.state, CartState::InProgress);
        assert_eq!(item.plan_type, PlanType::Monthly);
        assert_eq!(item.purchase_price, dec("100.00"));
        assert!(item.purchased_at.is_none());
    }

    #[tokio::test]
    async fn test_re_adding_same_service_updates_plan_in_place() {
        let (engine, store) = engine_with(
            StubCatalog::with_service(active_service("svc-1", "100.00")),
            StubIdentity::empty(),
        );
        let user = UserId::new("u-1");
        let service = ServiceId::new("svc-1");

        let first = engine
            .add_to_cart(&user, &service, PlanType::Monthly)
            .await
            .unwrap();
        let second = engine
            .add_to_cart(&user, &service, PlanType::Yearly)
            .await
            .unwrap();

        // One record, reused, with the latest plan and price
        assert_eq!(first.id, second.id);
        assert_eq!(second.plan_type, PlanType::Yearly);
        assert_eq!(second.purchase_price, dec("960.00"));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_add_unknown_service_is_not_found() {
        let (engine, _store) = engine_with(StubCatalog::empty(), StubIdentity::empty());

        let err = engine
            .add_to_cart(&UserId::new("u-1"), &ServiceId::new("ghost"), PlanType::Monthly)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_add_inactive_service_is_unavailable() {
        let mut service = active_service("svc-1", "100.00");
        service.active = false;
        let (engine, _store) = engine_with(StubCatalog::with_service(service), StubIdentity::empty());

        let err = engine
            .add_to_cart(&UserId::new("u-1"), &ServiceId::new("svc-1"), PlanType::Monthly)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::ServiceUnavailable(_)));
    }

    #[tokio::test]
    async fn test_add_with_missing_or_non_positive_price_is_invalid() {
        let mut service = active_service("svc-1", "100.00");
        service.price_per_quarter = None;
        service.price_per_year = Some(Decimal::ZERO);
        let (engine, _store) = engine_with(StubCatalog::with_service(service), StubIdentity::empty());
        let user = UserId::new("u-1");
        let svc = ServiceId::new("svc-1");

        let err = engine
            .add_to_cart(&user, &svc, PlanType::Quarterly)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidPrice(_)));

        let err = engine
            .add_to_cart(&user, &svc, PlanType::Yearly)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidPrice(_)));
    }

    #[tokio::test]
    async fn test_add_with_unreachable_catalog_is_a_hard_failure() {
        let (engine, _store) = engine_with(StubCatalog::unreachable(), StubIdentity::empty());

        let err = engine
            .add_to_cart(&UserId::new("u-1"), &ServiceId::new("svc-1"), PlanType::Monthly)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Catalog(_)));
    }

    #[tokio::test]
    async fn test_get_cart_totals_and_enrichment() {
        let catalog = StubCatalog::with_services(vec![
            active_service("svc-1", "100.00"),
            active_service("svc-2", "59.99"),
        ]);
        let (engine, _store) = engine_with(catalog, StubIdentity::with_buyer("u-1"));
        let user = UserId::new("u-1");

        engine
            .add_to_cart(&user, &ServiceId::new("svc-1"), PlanType::Monthly)
            .await
            .unwrap();
        engine
            .add_to_cart(&user, &ServiceId::new("svc-2"), PlanType::Monthly)
            .await
            .unwrap();

        let cart = engine.get_cart(&user, "token").await.unwrap();

        assert_eq!(cart.total_items, 2);
        assert_eq!(cart.total, dec("159.99"));
        assert!(cart.items.iter().all(|i| i.service.is_some()));
        assert!(cart.items.iter().all(|i| i.user.is_some()));
    }

    #[tokio::test]
    async fn test_enrichment_failures_degrade_silently() {
        let (engine, store) = engine_with(StubCatalog::unreachable(), StubIdentity::unreachable());
        let user = UserId::new("u-1");

        store.seed_in_progress(&user, "svc-1", PlanType::Monthly, dec("10.00"));

        let cart = engine.get_cart(&user, "token").await.unwrap();
        assert_eq!(cart.total_items, 1);
        let item = cart.items.first().unwrap();
        assert!(item.service.is_none());
        assert!(item.user.is_none());
    }

    #[tokio::test]
    async fn test_remove_not_found_forbidden_and_invalid_state() {
        let (engine, _store) = engine_with(
            StubCatalog::with_service(active_service("svc-1", "100.00")),
            StubIdentity::empty(),
        );
        let owner = UserId::new("u-1");
        let other = UserId::new("u-2");

        let item = engine
            .add_to_cart(&owner, &ServiceId::new("svc-1"), PlanType::Monthly)
            .await
            .unwrap();

        let err = engine
            .remove_from_cart(CartItemId::generate(), &owner)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let err = engine.remove_from_cart(item.id, &other).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));

        engine.checkout(&owner, "token").await.unwrap();
        let err = engine.remove_from_cart(item.id, &owner).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidState(_)));
    }

    #[tokio::test]
    async fn test_remove_deletes_the_record() {
        let (engine, store) = engine_with(
            StubCatalog::with_service(active_service("svc-1", "100.00")),
            StubIdentity::empty(),
        );
        let user = UserId::new("u-1");

        let item = engine
            .add_to_cart(&user, &ServiceId::new("svc-1"), PlanType::Monthly)
            .await
            .unwrap();
        engine.remove_from_cart(item.id, &user).await.unwrap();

        assert_eq!(store.len(), 0);
    }

    #[tokio::test]
    async fn test_checkout_empty_cart_fails_and_changes_nothing() {
        let (engine, store) = engine_with(StubCatalog::empty(), StubIdentity::empty());

        let err = engine
            .checkout(&UserId::new("u-1"), "token")
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::EmptyCart));
        assert_eq!(store.len(), 0);
    }

    #[tokio::test]
    async fn test_checkout_transitions_every_item_with_calendar_expiry() {
        let catalog = StubCatalog::with_services(vec![
            active_service("svc-1", "100.00"),
            active_service("svc-2", "59.99"),
        ]);
        let (engine, _store) = engine_with(catalog, StubIdentity::empty());
        let user = UserId::new("u-1");

        engine
            .add_to_cart(&user, &ServiceId::new("svc-1"), PlanType::Monthly)
            .await
            .unwrap();
        engine
            .add_to_cart(&user, &ServiceId::new("svc-2"), PlanType::Yearly)
            .await
            .unwrap();

        let purchased = engine.checkout(&user, "token").await.unwrap();
        assert_eq!(purchased.len(), 2);

        for enriched in &purchased {
            let item = &enriched.item;
            assert_eq!(item.state, CartState::Purchased);
            let purchased_at = item.purchased_at.unwrap();
            let expected = purchased_at + Months::new(item.plan_type.months());
            assert_eq!(item.expires_at.unwrap(), expected);
        }

        // Cart is empty afterwards
        let cart = engine.get_cart(&user, "token").await.unwrap();
        assert_eq!(cart.total_items, 0);
        assert_eq!(cart.total, Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_access_granted_after_checkout_and_denied_after_expiry() {
        let (engine, store) = engine_with(
            StubCatalog::with_service(active_service("svc-1", "100.00")),
            StubIdentity::empty(),
        );
        let user = UserId::new("u-1");
        let service = ServiceId::new("svc-1");

        assert!(!engine.check_access(&user, &service).await.unwrap());

        engine
            .add_to_cart(&user, &service, PlanType::Monthly)
            .await
            .unwrap();
        engine.checkout(&user, "token").await.unwrap();

        assert!(engine.check_access(&user, &service).await.unwrap());

        // Backdate the expiry: access must lapse even before the sweep runs
        store.backdate_expiry(&user, &service, Duration::days(1));
        assert!(!engine.check_access(&user, &service).await.unwrap());
    }

    #[tokio::test]
    async fn test_lazy_expiry_excludes_overdue_records_from_active_view() {
        let (engine, store) = engine_with(StubCatalog::empty(), StubIdentity::empty());
        let user = UserId::new("u-1");

        store.seed_purchased(&user, "svc-live", PlanType::Monthly, dec("10.00"), Duration::days(10));
        store.seed_purchased(&user, "svc-dead", PlanType::Monthly, dec("20.00"), Duration::days(-3));

        let active = engine.subscriptions(&user, false).await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active.first().unwrap().service_id.as_str(), "svc-live");

        let all = engine.subscriptions(&user, true).await.unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn test_subscriptions_are_ordered_newest_purchase_first() {
        let (engine, store) = engine_with(StubCatalog::empty(), StubIdentity::empty());
        let user = UserId::new("u-1");

        store.seed_purchased_at(
            &user,
            "svc-old",
            dec("10.00"),
            Utc::now() - Duration::days(30),
            Utc::now() + Duration::days(30),
        );
        store.seed_purchased_at(
            &user,
            "svc-new",
            dec("10.00"),
            Utc::now() - Duration::days(1),
            Utc::now() + Duration::days(60),
        );

        let subs = engine.subscriptions(&user, true).await.unwrap();
        assert_eq!(subs.first().unwrap().service_id.as_str(), "svc-new");
        assert_eq!(subs.last().unwrap().service_id.as_str(), "svc-old");
    }

    #[tokio::test]
    async fn test_sweep_is_idempotent() {
        let (engine, store) = engine_with(StubCatalog::empty(), StubIdentity::empty());
        let user = UserId::new("u-1");

        store.seed_purchased(&user, "svc-dead", PlanType::Monthly, dec("20.00"), Duration::days(-3));
        store.seed_purchased(&user, "svc-live", PlanType::Monthly, dec("10.00"), Duration::days(3));

        assert_eq!(engine.sweep_expired().await.unwrap(), 1);
        // Second run finds nothing left to flip
        assert_eq!(engine.sweep_expired().await.unwrap(), 0);

        let all = engine.subscriptions(&user, true).await.unwrap();
        let expired: Vec<_> = all
            .iter()
            .filter(|s| s.state == CartState::Expired)
            .collect();
        assert_eq!(expired.len(), 1);
        assert_eq!(expired.first().unwrap().service_id.as_str(), "svc-dead");
    }

    #[tokio::test]
    async fn test_statistics_counts_and_exact_total() {
        let (engine, store) = engine_with(
            StubCatalog::with_service(active_service("svc-cart", "5.50")),
            StubIdentity::empty(),
        );
        let user = UserId::new("u-1");

        engine
            .add_to_cart(&user, &ServiceId::new("svc-cart"), PlanType::Monthly)
            .await
            .unwrap();
        store.seed_purchased(&user, "svc-live", PlanType::Monthly, dec("10.10"), Duration::days(5));
        store.seed_purchased(&user, "svc-dead", PlanType::Monthly, dec("20.20"), Duration::days(-5));
        engine.sweep_expired().await.unwrap();

        let stats = engine.statistics(&user).await.unwrap();
        assert_eq!(stats.items_in_cart, 1);
        assert_eq!(stats.active_subscriptions, 1);
        assert_eq!(stats.expired_subscriptions, 1);
        // 10.10 + 20.20, exactly - cart items do not count as spend
        assert_eq!(stats.total_spent, dec("30.30"));
    }

    #[tokio::test]
    async fn test_worked_example_monthly_hundred() {
        let (engine, _store) = engine_with(
            StubCatalog::with_service(active_service("s1", "100.00")),
            StubIdentity::with_buyer("u1"),
        );
        let user = UserId::new("u1");

        engine
            .add_to_cart(&user, &ServiceId::new("s1"), PlanType::Monthly)
            .await
            .unwrap();

        let cart = engine.get_cart(&user, "token").await.unwrap();
        assert_eq!(cart.total_items, 1);
        assert_eq!(cart.total.to_string(), "100.00");

        engine.checkout(&user, "token").await.unwrap();

        let active = engine.subscriptions(&user, false).await.unwrap();
        assert_eq!(active.len(), 1);
        let sub = active.first().unwrap();
        assert_eq!(sub.purchase_price.to_string(), "100.00");
        let purchased_at = sub.purchased_at.unwrap();
        assert_eq!(sub.expires_at.unwrap(), purchased_at + Months::new(1));
    }
}
