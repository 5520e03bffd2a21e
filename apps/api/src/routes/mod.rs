pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, patch, post, put},
    Router,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::state::AppState;
use crate::{
    accounts, activities, ai_settings, analytics, candidates, chat, outreach, subscription,
    vacancies,
};

/// `?user_id=` on read endpoints. Stands in for an authenticated principal.
#[derive(Debug, Deserialize)]
pub struct UserIdQuery {
    pub user_id: Uuid,
}

const DEFAULT_PAGE_SIZE: i64 = 100;
const MAX_PAGE_SIZE: i64 = 500;

/// Clamps `?skip=&limit=` to a non-negative offset and a bounded page size.
pub fn page_bounds(skip: i64, limit: Option<i64>) -> (i64, i64) {
    let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
    (skip.max(0), limit)
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Accounts & subscription
        .route(
            "/api/v1/accounts",
            post(accounts::handlers::handle_create_account),
        )
        .route(
            "/api/v1/accounts/:id",
            get(accounts::handlers::handle_get_account),
        )
        .route(
            "/api/v1/accounts/:id/subscription",
            put(accounts::handlers::handle_change_subscription),
        )
        .route(
            "/api/v1/subscription/status",
            get(subscription::handlers::handle_subscription_status),
        )
        .route(
            "/api/v1/subscription/tiers",
            get(subscription::handlers::handle_list_tiers),
        )
        // Vacancies
        .route(
            "/api/v1/vacancies",
            post(vacancies::handlers::handle_create_vacancy)
                .get(vacancies::handlers::handle_list_vacancies),
        )
        .route(
            "/api/v1/vacancies/:id",
            get(vacancies::handlers::handle_get_vacancy)
                .delete(vacancies::handlers::handle_delete_vacancy),
        )
        // Candidates
        .route(
            "/api/v1/candidates",
            get(candidates::handlers::handle_list_candidates),
        )
        .route(
            "/api/v1/candidates/upload",
            post(candidates::handlers::handle_upload)
                .layer(DefaultBodyLimit::max(candidates::handlers::MAX_RESUME_BYTES)),
        )
        .route(
            "/api/v1/candidates/bulk",
            post(candidates::handlers::handle_bulk_add),
        )
        .route(
            "/api/v1/candidates/:id",
            get(candidates::handlers::handle_get_candidate),
        )
        .route(
            "/api/v1/candidates/:id/status",
            patch(candidates::handlers::handle_update_status),
        )
        .route(
            "/api/v1/candidates/:id/analyze",
            post(candidates::handlers::handle_analyze),
        )
        .route(
            "/api/v1/candidates/:id/outreach",
            post(outreach::handlers::handle_outreach),
        )
        // Chat
        .route("/api/v1/chat", post(chat::handlers::handle_send_message))
        .route("/api/v1/chat/hr-ask", post(chat::handlers::handle_hr_ask))
        .route(
            "/api/v1/chat/:candidate_id",
            get(chat::handlers::handle_chat_history),
        )
        // Activity feed & analytics
        .route(
            "/api/v1/activities",
            get(activities::handlers::handle_list_activities)
                .post(activities::handlers::handle_create_activity),
        )
        .route(
            "/api/v1/analytics",
            get(analytics::handlers::handle_get_analytics),
        )
        // AI settings
        .route(
            "/api/v1/ai-settings",
            get(ai_settings::handlers::handle_get_ai_settings)
                .put(ai_settings::handlers::handle_update_ai_settings),
        )
        .with_state(state)
}
