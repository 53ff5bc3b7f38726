//! Subscription route handlers: listing, access checks, statistics.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use subcart_core::ServiceId;

use crate::error::Result;
use crate::middleware::CurrentUser;
use crate::models::CartItem;
use crate::services::UserStatistics;
use crate::state::AppState;

/// Query parameters for the subscription listing.
#[derive(Debug, Deserialize)]
pub struct SubscriptionsQuery {
    #[serde(default)]
    pub include_expired: bool,
}

/// Subscription listing envelope.
#[derive(Debug, Serialize)]
pub struct SubscriptionsResponse {
    pub subscriptions: Vec<CartItem>,
    pub total_subscriptions: usize,
}

/// Access check response.
#[derive(Debug, Serialize)]
pub struct AccessResponse {
    pub has_access: bool,
    pub service_id: String,
    pub user_id: String,
}

/// List the caller's subscriptions, newest purchase first.
///
/// Without `include_expired`, only date-active subscriptions are returned.
#[instrument(skip(state, user))]
pub async fn index(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<SubscriptionsQuery>,
) -> Result<Json<SubscriptionsResponse>> {
    let subscriptions = state
        .engine()
        .subscriptions(&user.user_id(), query.include_expired)
        .await?;

    let total_subscriptions = subscriptions.len();
    Ok(Json(SubscriptionsResponse {
        subscriptions,
        total_subscriptions,
    }))
}

/// Whether the caller currently holds access to a service.
#[instrument(skip(state, user))]
pub async fn access(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(service_id): Path<String>,
) -> Result<Json<AccessResponse>> {
    let user_id = user.user_id();
    let service_id = ServiceId::new(service_id);

    let has_access = state.engine().check_access(&user_id, &service_id).await?;

    Ok(Json(AccessResponse {
        has_access,
        service_id: service_id.into_inner(),
        user_id: user_id.into_inner(),
    }))
}

/// The caller's cart/subscription counters.
#[instrument(skip(state, user))]
pub async fn stats(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<UserStatistics>> {
    let stats = state.engine().statistics(&user.user_id()).await?;
    Ok(Json(stats))
}
