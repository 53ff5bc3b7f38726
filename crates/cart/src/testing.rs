//! Shared test fixtures: in-memory store, stub collaborators, and helpers
//! for building an engine or a full router without Postgres or the network.

#![allow(clippy::unwrap_used)]

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use secrecy::SecretString;

use subcart_core::{
    CartItemId, CartState, Claims, PlanType, ServiceId, ServiceSummary, UserId, UserRole,
    UserSummary,
};

use crate::clients::{CatalogClient, CatalogError, IdentityClient, IdentityError};
use crate::config::CartConfig;
use crate::db::{CartStore, RepositoryError};
use crate::models::CartItem;
use crate::services::CartEngine;
use crate::state::AppState;

// =============================================================================
// In-memory store
// =============================================================================

/// In-memory [`CartStore`] mirroring the Postgres adapter's semantics,
/// including the partial-unique-index conflict on duplicate `IN_PROGRESS`
/// records.
#[derive(Default)]
pub struct MemoryCartStore {
    items: Mutex<Vec<CartItem>>,
}

impl MemoryCartStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn len(&self) -> usize {
        self.items.lock().unwrap().len()
    }

    /// Seed an `IN_PROGRESS` record directly, bypassing the engine.
    pub fn seed_in_progress(
        &self,
        user_id: &UserId,
        service_id: &str,
        plan_type: PlanType,
        price: Decimal,
    ) -> CartItem {
        let item = CartItem::new(
            user_id.clone(),
            ServiceId::new(service_id),
            plan_type,
            price,
            Utc::now(),
        );
        self.items.lock().unwrap().push(item.clone());
        item
    }

    /// Seed a `PURCHASED` record whose expiry sits `expires_in` from now
    /// (negative durations produce an already-overdue record).
    pub fn seed_purchased(
        &self,
        user_id: &UserId,
        service_id: &str,
        plan_type: PlanType,
        price: Decimal,
        expires_in: Duration,
    ) -> CartItem {
        let now = Utc::now();
        let mut item = CartItem::new(
            user_id.clone(),
            ServiceId::new(service_id),
            plan_type,
            price,
            now - Duration::days(30),
        );
        item.state = CartState::Purchased;
        item.purchased_at = Some(now - Duration::days(1));
        item.expires_at = Some(now + expires_in);
        self.items.lock().unwrap().push(item.clone());
        item
    }

    /// Seed a `PURCHASED` record with explicit timestamps.
    pub fn seed_purchased_at(
        &self,
        user_id: &UserId,
        service_id: &str,
        price: Decimal,
        purchased_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> CartItem {
        let mut item = CartItem::new(
            user_id.clone(),
            ServiceId::new(service_id),
            PlanType::Monthly,
            price,
            purchased_at,
        );
        item.state = CartState::Purchased;
        item.purchased_at = Some(purchased_at);
        item.expires_at = Some(expires_at);
        self.items.lock().unwrap().push(item.clone());
        item
    }

    /// Shift a purchased record's expiry into the past without touching its
    /// stored state (simulates a sweep that has not run yet).
    pub fn backdate_expiry(&self, user_id: &UserId, service_id: &ServiceId, by: Duration) {
        let mut items = self.items.lock().unwrap();
        for item in items.iter_mut() {
            if item.user_id == *user_id
                && item.service_id == *service_id
                && item.state == CartState::Purchased
            {
                item.expires_at = Some(Utc::now() - by);
            }
        }
    }
}

#[async_trait]
impl CartStore for MemoryCartStore {
    async fn insert(&self, item: &CartItem) -> Result<CartItem, RepositoryError> {
        let mut items = self.items.lock().unwrap();
        if item.state == CartState::InProgress
            && items.iter().any(|i| {
                i.state == CartState::InProgress
                    && i.user_id == item.user_id
                    && i.service_id == item.service_id
            })
        {
            return Err(RepositoryError::Conflict(
                "cart already holds an in-progress record for this service".to_owned(),
            ));
        }
        items.push(item.clone());
        Ok(item.clone())
    }

    async fn find_by_id(&self, id: CartItemId) -> Result<Option<CartItem>, RepositoryError> {
        Ok(self
            .items
            .lock()
            .unwrap()
            .iter()
            .find(|i| i.id == id)
            .cloned())
    }

    async fn find_by_user_and_state(
        &self,
        user_id: &UserId,
        state: CartState,
    ) -> Result<Vec<CartItem>, RepositoryError> {
        let mut found: Vec<CartItem> = self
            .items
            .lock()
            .unwrap()
            .iter()
            .filter(|i| i.user_id == *user_id && i.state == state)
            .cloned()
            .collect();
        found.sort_by_key(|i| i.added_at);
        Ok(found)
    }

    async fn find_in_progress(
        &self,
        user_id: &UserId,
        service_id: &ServiceId,
    ) -> Result<Option<CartItem>, RepositoryError> {
        Ok(self
            .items
            .lock()
            .unwrap()
            .iter()
            .find(|i| {
                i.user_id == *user_id
                    && i.service_id == *service_id
                    && i.state == CartState::InProgress
            })
            .cloned())
    }

    async fn update_plan(
        &self,
        id: CartItemId,
        plan_type: PlanType,
        price: Decimal,
    ) -> Result<CartItem, RepositoryError> {
        let mut items = self.items.lock().unwrap();
        let item = items
            .iter_mut()
            .find(|i| i.id == id && i.state == CartState::InProgress)
            .ok_or(RepositoryError::NotFound)?;
        item.plan_type = plan_type;
        item.purchase_price = price;
        Ok(item.clone())
    }

    async fn mark_purchased(
        &self,
        id: CartItemId,
        purchased_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Result<CartItem, RepositoryError> {
        let mut items = self.items.lock().unwrap();
        let item = items
            .iter_mut()
            .find(|i| i.id == id && i.state == CartState::InProgress)
            .ok_or(RepositoryError::NotFound)?;
        item.state = CartState::Purchased;
        item.purchased_at = Some(purchased_at);
        item.expires_at = Some(expires_at);
        Ok(item.clone())
    }

    async fn delete(&self, id: CartItemId) -> Result<bool, RepositoryError> {
        let mut items = self.items.lock().unwrap();
        let before = items.len();
        items.retain(|i| i.id != id);
        Ok(items.len() < before)
    }

    async fn count_by_user_and_state(
        &self,
        user_id: &UserId,
        state: CartState,
    ) -> Result<i64, RepositoryError> {
        let count = self
            .items
            .lock()
            .unwrap()
            .iter()
            .filter(|i| i.user_id == *user_id && i.state == state)
            .count();
        Ok(count as i64)
    }

    async fn active_subscriptions(
        &self,
        user_id: &UserId,
        now: DateTime<Utc>,
    ) -> Result<Vec<CartItem>, RepositoryError> {
        let mut found: Vec<CartItem> = self
            .items
            .lock()
            .unwrap()
            .iter()
            .filter(|i| i.user_id == *user_id && i.is_active_at(now))
            .cloned()
            .collect();
        found.sort_by_key(|i| std::cmp::Reverse(i.purchased_at));
        Ok(found)
    }

    async fn all_subscriptions(&self, user_id: &UserId) -> Result<Vec<CartItem>, RepositoryError> {
        let mut found: Vec<CartItem> = self
            .items
            .lock()
            .unwrap()
            .iter()
            .filter(|i| {
                i.user_id == *user_id
                    && matches!(i.state, CartState::Purchased | CartState::Expired)
            })
            .cloned()
            .collect();
        found.sort_by_key(|i| std::cmp::Reverse(i.purchased_at));
        Ok(found)
    }

    async fn count_active_subscriptions(
        &self,
        user_id: &UserId,
        now: DateTime<Utc>,
    ) -> Result<i64, RepositoryError> {
        let count = self
            .items
            .lock()
            .unwrap()
            .iter()
            .filter(|i| i.user_id == *user_id && i.is_active_at(now))
            .count();
        Ok(count as i64)
    }

    async fn has_active_access(
        &self,
        user_id: &UserId,
        service_id: &ServiceId,
        now: DateTime<Utc>,
    ) -> Result<bool, RepositoryError> {
        Ok(self
            .items
            .lock()
            .unwrap()
            .iter()
            .any(|i| i.user_id == *user_id && i.service_id == *service_id && i.is_active_at(now)))
    }

    async fn expire_overdue(&self, now: DateTime<Utc>) -> Result<u64, RepositoryError> {
        let mut items = self.items.lock().unwrap();
        let mut updated = 0;
        for item in items.iter_mut() {
            if item.state == CartState::Purchased && item.expires_at.is_some_and(|exp| exp < now) {
                item.state = CartState::Expired;
                updated += 1;
            }
        }
        Ok(updated)
    }

    async fn total_spent(&self, user_id: &UserId) -> Result<Decimal, RepositoryError> {
        let total = self
            .items
            .lock()
            .unwrap()
            .iter()
            .filter(|i| {
                i.user_id == *user_id
                    && matches!(i.state, CartState::Purchased | CartState::Expired)
            })
            .map(|i| i.purchase_price)
            .sum();
        Ok(total)
    }
}

// =============================================================================
// Stub collaborators
// =============================================================================

/// Stub catalog serving a fixed set of services, or failing outright.
#[derive(Default)]
pub struct StubCatalog {
    services: HashMap<String, ServiceSummary>,
    unreachable: bool,
}

impl StubCatalog {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_service(service: ServiceSummary) -> Self {
        Self::with_services(vec![service])
    }

    pub fn with_services(services: Vec<ServiceSummary>) -> Self {
        Self {
            services: services.into_iter().map(|s| (s.id.clone(), s)).collect(),
            unreachable: false,
        }
    }

    pub fn unreachable() -> Self {
        Self {
            services: HashMap::new(),
            unreachable: true,
        }
    }
}

#[async_trait]
impl CatalogClient for StubCatalog {
    async fn get_service(&self, id: &ServiceId) -> Result<Option<ServiceSummary>, CatalogError> {
        if self.unreachable {
            return Err(CatalogError::Api {
                status: 503,
                message: "catalog down".to_owned(),
            });
        }
        Ok(self.services.get(id.as_str()).cloned())
    }
}

/// Stub identity service serving a fixed set of users, or failing outright.
#[derive(Default)]
pub struct StubIdentity {
    users: HashMap<String, UserSummary>,
    unreachable: bool,
}

impl StubIdentity {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_buyer(user_id: &str) -> Self {
        let user = UserSummary {
            id: user_id.to_owned(),
            name: "Test Buyer".to_owned(),
            email: format!("{user_id}@example.com"),
            role: UserRole::Buyer,
        };
        Self {
            users: HashMap::from([(user.id.clone(), user)]),
            unreachable: false,
        }
    }

    pub fn unreachable() -> Self {
        Self {
            users: HashMap::new(),
            unreachable: true,
        }
    }
}

#[async_trait]
impl IdentityClient for StubIdentity {
    async fn get_user(
        &self,
        id: &UserId,
        _token: &str,
    ) -> Result<Option<UserSummary>, IdentityError> {
        if self.unreachable {
            return Err(IdentityError::Api {
                status: 503,
                message: "identity down".to_owned(),
            });
        }
        Ok(self.users.get(id.as_str()).cloned())
    }
}

// =============================================================================
// Fixtures
// =============================================================================

/// Shared test JWT secret (meets the length requirement; validation is
/// bypassed by constructing the config directly).
pub const TEST_JWT_SECRET: &str = "kQ2vX8mB5nW3jR7tY1uP9sD4fG6hL0cZ";

/// An active service with the given monthly price; quarterly and yearly
/// prices are discounted multiples so each plan resolves distinctly.
pub fn active_service(id: &str, monthly: &str) -> ServiceSummary {
    let monthly = Decimal::from_str(monthly).unwrap();
    ServiceSummary {
        id: id.to_owned(),
        name: format!("Service {id}"),
        description: Some("test service".to_owned()),
        category: Some("testing".to_owned()),
        image_url: None,
        active: true,
        price_per_month: Some(monthly),
        price_per_quarter: Some(monthly * Decimal::from_str("2.7").unwrap()),
        price_per_year: Some(monthly * Decimal::from_str("9.6").unwrap()),
    }
}

/// Build an engine over a fresh in-memory store and the given stubs.
pub fn engine_with(
    catalog: StubCatalog,
    identity: StubIdentity,
) -> (CartEngine, Arc<MemoryCartStore>) {
    let store = MemoryCartStore::new();
    let engine = CartEngine::new(store.clone(), Arc::new(catalog), Arc::new(identity));
    (engine, store)
}

/// Build a full application state over the in-memory store and stubs.
///
/// The pool is lazily connected and never used; only the readiness probe
/// would touch it.
pub fn state_with(
    catalog: StubCatalog,
    identity: StubIdentity,
) -> (AppState, Arc<MemoryCartStore>) {
    let config = CartConfig {
        database_url: SecretString::from("postgres://localhost/subcart_test"),
        host: "127.0.0.1".parse().unwrap(),
        port: 0,
        jwt_secret: SecretString::from(TEST_JWT_SECRET),
        catalog_base_url: "http://localhost:3002".to_owned(),
        identity_base_url: "http://localhost:3001".to_owned(),
        sentry_dsn: None,
    };

    let pool = sqlx::postgres::PgPoolOptions::new()
        .connect_lazy("postgres://localhost/subcart_test")
        .unwrap();

    let store = MemoryCartStore::new();
    let state = AppState::new(
        config,
        pool,
        store.clone(),
        Arc::new(catalog),
        Arc::new(identity),
    );
    (state, store)
}

/// Issue a signed bearer token for the given user and role.
pub fn issue_token(user_id: &str, role: UserRole) -> String {
    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: user_id.to_owned(),
        name: "Test User".to_owned(),
        email: format!("{user_id}@example.com"),
        role,
        iat: now,
        exp: now + 3600,
    };

    jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &claims,
        &jsonwebtoken::EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes()),
    )
    .unwrap()
}
