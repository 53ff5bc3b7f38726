//! Operator-only route handlers.

use axum::{Json, extract::State};
use serde::Serialize;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::middleware::CurrentUser;
use crate::state::AppState;

/// Sweep response envelope.
#[derive(Debug, Serialize)]
pub struct SweepResponse {
    pub message: String,
    pub updated: u64,
}

/// Flip overdue purchased records to expired.
///
/// Admin role required; the CLI `sweep` command is the scheduled caller,
/// this endpoint exists for ad-hoc operator use.
#[instrument(skip(state, user))]
pub async fn sweep(State(state): State<AppState>, user: CurrentUser) -> Result<Json<SweepResponse>> {
    if !user.is_admin() {
        return Err(AppError::Forbidden("admin role required".to_owned()));
    }

    let updated = state.engine().sweep_expired().await?;

    Ok(Json(SweepResponse {
        message: format!("subscriptions updated: {updated}"),
        updated,
    }))
}
