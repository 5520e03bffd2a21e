use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Utc;

use crate::accounts::store::fetch_account;
use crate::errors::AppError;
use crate::routes::UserIdQuery;
use crate::state::AppState;
use crate::subscription::limiter::{SubscriptionStatus, UsageLimiter};
use crate::subscription::tiers::TierTable;

/// GET /api/v1/subscription/status
pub async fn handle_subscription_status(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<SubscriptionStatus>, AppError> {
    let account = fetch_account(&state.db, params.user_id).await?;
    let limiter = UsageLimiter::new(&state.config.tiers);
    Ok(Json(limiter.status(&account, Utc::now())))
}

/// GET /api/v1/subscription/tiers
pub async fn handle_list_tiers(State(state): State<AppState>) -> Json<TierTable> {
    Json(state.config.tiers.clone())
}
