//! Application state shared across handlers.

use std::sync::Arc;

use jsonwebtoken::DecodingKey;
use secrecy::ExposeSecret;
use sqlx::PgPool;

use crate::clients::{CatalogClient, IdentityClient};
use crate::config::CartConfig;
use crate::db::CartStore;
use crate::services::CartEngine;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like the engine, database pool, and configuration.
/// The store and collaborator clients are injected at construction; the
/// process entry point owns their lifecycles.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: CartConfig,
    pool: PgPool,
    engine: CartEngine,
    decoding_key: DecodingKey,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Cart service configuration
    /// * `pool` - `PostgreSQL` connection pool (kept for readiness checks)
    /// * `store` - Persistence adapter for cart records
    /// * `catalog` - Catalog collaborator client
    /// * `identity` - Identity collaborator client
    #[must_use]
    pub fn new(
        config: CartConfig,
        pool: PgPool,
        store: Arc<dyn CartStore>,
        catalog: Arc<dyn CatalogClient>,
        identity: Arc<dyn IdentityClient>,
    ) -> Self {
        let decoding_key =
            DecodingKey::from_secret(config.jwt_secret.expose_secret().as_bytes());
        let engine = CartEngine::new(store, catalog, identity);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                engine,
                decoding_key,
            }),
        }
    }

    /// Get a reference to the service configuration.
    #[must_use]
    pub fn config(&self) -> &CartConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the cart engine.
    #[must_use]
    pub fn engine(&self) -> &CartEngine {
        &self.inner.engine
    }

    /// Get the JWT decoding key for bearer token verification.
    #[must_use]
    pub fn decoding_key(&self) -> &DecodingKey {
        &self.inner.decoding_key
    }
}
