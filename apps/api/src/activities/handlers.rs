use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use crate::accounts::store::fetch_account;
use crate::activities::store::{list_activities, record_activity, NewActivity};
use crate::errors::AppError;
use crate::models::activity::ActivityRow;
use crate::routes::page_bounds;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListActivitiesQuery {
    pub user_id: Uuid,
    #[serde(default)]
    pub skip: i64,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct CreateActivityRequest {
    pub user_id: Uuid,
    pub action_type: String,
    pub description: String,
    pub entity_type: Option<String>,
    pub entity_id: Option<String>,
    pub entity_name: Option<String>,
    pub metadata: Option<Value>,
}

/// GET /api/v1/activities
pub async fn handle_list_activities(
    State(state): State<AppState>,
    Query(params): Query<ListActivitiesQuery>,
) -> Result<Json<Vec<ActivityRow>>, AppError> {
    let (offset, limit) = page_bounds(params.skip, params.limit);
    Ok(Json(
        list_activities(&state.db, params.user_id, offset, limit).await?,
    ))
}

/// POST /api/v1/activities
pub async fn handle_create_activity(
    State(state): State<AppState>,
    Json(req): Json<CreateActivityRequest>,
) -> Result<(StatusCode, Json<ActivityRow>), AppError> {
    let account = fetch_account(&state.db, req.user_id).await?;
    let entry = client_activity(req, &account.email)?;
    let stored = record_activity(&state.db, account.id, &entry).await?;
    Ok((StatusCode::CREATED, Json(stored)))
}

/// Validates a client-posted entry and stamps it with the poster's email.
fn client_activity(req: CreateActivityRequest, email: &str) -> Result<NewActivity, AppError> {
    let action_type = req.action_type.trim();
    if action_type.is_empty() {
        return Err(AppError::Validation("action_type cannot be empty".to_string()));
    }
    if req.description.trim().is_empty() {
        return Err(AppError::Validation("description cannot be empty".to_string()));
    }
    Ok(NewActivity {
        action_type: action_type.to_string(),
        description: req.description,
        entity_type: req.entity_type,
        entity_id: req.entity_id,
        entity_name: req.entity_name,
        metadata: req.metadata,
        created_by: Some(email.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(action_type: &str, description: &str) -> CreateActivityRequest {
        CreateActivityRequest {
            user_id: Uuid::new_v4(),
            action_type: action_type.to_string(),
            description: description.to_string(),
            entity_type: Some("candidate".to_string()),
            entity_id: None,
            entity_name: Some("Иванов".to_string()),
            metadata: None,
        }
    }

    #[test]
    fn test_client_activity_is_stamped_with_poster() {
        let entry = client_activity(request(" EMAIL_SENT ", "Отправлено приглашение"), "hr@x.ru")
            .unwrap();
        assert_eq!(entry.action_type, "EMAIL_SENT");
        assert_eq!(entry.created_by.as_deref(), Some("hr@x.ru"));
        assert_eq!(entry.entity_name.as_deref(), Some("Иванов"));
    }

    #[test]
    fn test_blank_fields_are_rejected() {
        assert!(matches!(
            client_activity(request("  ", "x"), "hr@x.ru"),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            client_activity(request("NOTE", ""), "hr@x.ru"),
            Err(AppError::Validation(_))
        ));
    }
}
