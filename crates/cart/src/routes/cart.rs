//! Cart route handlers: show, add, remove, checkout.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use uuid::Uuid;

use subcart_core::{CartItemId, PlanType, ServiceId};

use crate::error::{AppError, Result};
use crate::middleware::CurrentUser;
use crate::models::{CartItem, EnrichedCartItem};
use crate::services::CartContents;
use crate::state::AppState;

/// Add to cart request body.
#[derive(Debug, Deserialize)]
pub struct AddToCartRequest {
    pub service_id: String,
    pub plan_type: PlanType,
}

/// Add to cart response envelope.
#[derive(Debug, Serialize)]
pub struct AddToCartResponse {
    pub message: String,
    pub item: CartItem,
}

/// Generic message envelope.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Checkout response envelope.
#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub message: String,
    pub subscriptions: Vec<EnrichedCartItem>,
}

/// Display the caller's cart with totals and enrichment.
#[instrument(skip(state, user))]
pub async fn show(State(state): State<AppState>, user: CurrentUser) -> Result<Json<CartContents>> {
    let cart = state.engine().get_cart(&user.user_id(), &user.token).await?;
    Ok(Json(cart))
}

/// Add a service to the caller's cart (or change the plan of the item
/// already there).
#[instrument(skip(state, user, body))]
pub async fn add(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(body): Json<AddToCartRequest>,
) -> Result<(StatusCode, Json<AddToCartResponse>)> {
    if body.service_id.trim().is_empty() {
        return Err(AppError::BadRequest("service_id is required".to_owned()));
    }

    let item = state
        .engine()
        .add_to_cart(
            &user.user_id(),
            &ServiceId::new(body.service_id),
            body.plan_type,
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(AddToCartResponse {
            message: "service added to cart".to_owned(),
            item,
        }),
    ))
}

/// Remove an in-progress item from the caller's cart.
#[instrument(skip(state, user))]
pub async fn remove(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(item_id): Path<Uuid>,
) -> Result<Json<MessageResponse>> {
    state
        .engine()
        .remove_from_cart(CartItemId::new(item_id), &user.user_id())
        .await?;

    Ok(Json(MessageResponse {
        message: "item removed from cart".to_owned(),
    }))
}

/// Purchase everything in the caller's cart.
#[instrument(skip(state, user))]
pub async fn checkout(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<CheckoutResponse>> {
    let subscriptions = state.engine().checkout(&user.user_id(), &user.token).await?;

    Ok(Json(CheckoutResponse {
        message: "purchase processed successfully".to_owned(),
        subscriptions,
    }))
}
