use axum::{
    extract::{Query, State},
    Json,
};

use crate::accounts::store::fetch_account;
use crate::analytics::store::{fetch_summary, AnalyticsSummary};
use crate::errors::AppError;
use crate::routes::UserIdQuery;
use crate::state::AppState;

/// GET /api/v1/analytics
pub async fn handle_get_analytics(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<AnalyticsSummary>, AppError> {
    fetch_account(&state.db, params.user_id).await?;
    Ok(Json(fetch_summary(&state.db, params.user_id).await?))
}
