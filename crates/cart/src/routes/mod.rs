//! HTTP route handlers for the cart service.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                 - Liveness check (wired in main)
//! GET    /health/ready           - Readiness check, pings the database
//!
//! # Cart
//! GET    /cart                   - Current cart with totals and enrichment
//! POST   /cart                   - Add a service (or change its plan)
//! DELETE /cart/{item_id}         - Remove an in-progress item
//!
//! # Checkout
//! POST   /checkout               - Purchase everything in the cart
//!
//! # Subscriptions
//! GET    /subscriptions          - List subscriptions (?include_expired=)
//! GET    /access/{service_id}    - Date-based access check
//! GET    /stats                  - Per-user counters
//!
//! # Operations (admin role)
//! POST   /sweep                  - Flip overdue subscriptions to expired
//! ```
//!
//! All routes except the health checks require a bearer token.

pub mod admin;
pub mod cart;
pub mod subscriptions;

use axum::{
    Router,
    routing::{delete, get, post},
};

use crate::state::AppState;

/// Create all routes for the cart service.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/cart", get(cart::show).post(cart::add))
        .route("/cart/{item_id}", delete(cart::remove))
        .route("/checkout", post(cart::checkout))
        .route("/subscriptions", get(subscriptions::index))
        .route("/access/{service_id}", get(subscriptions::access))
        .route("/stats", get(subscriptions::stats))
        .route("/sweep", post(admin::sweep))
}
