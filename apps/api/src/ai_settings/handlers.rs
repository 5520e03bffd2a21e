use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::accounts::store::fetch_account;
use crate::ai_settings::store::{fetch_settings, upsert_settings};
use crate::errors::AppError;
use crate::models::ai_settings::AiSettingsRow;
use crate::routes::UserIdQuery;
use crate::state::AppState;

const MAX_TEMPERATURE: f32 = 2.0;

/// Every field is optional; missing ones keep their stored (or default) value.
#[derive(Debug, Deserialize)]
pub struct UpdateAiSettingsRequest {
    pub user_id: Uuid,
    pub ai_role: Option<String>,
    pub system_prompt: Option<String>,
    pub model_name: Option<String>,
    pub temperature: Option<f32>,
}

/// GET /api/v1/ai-settings
///
/// Creates the default settings row on first access.
pub async fn handle_get_ai_settings(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<AiSettingsRow>, AppError> {
    fetch_account(&state.db, params.user_id).await?;
    if let Some(settings) = fetch_settings(&state.db, params.user_id).await? {
        return Ok(Json(settings));
    }
    let created = upsert_settings(&state.db, &AiSettingsRow::defaults_for(params.user_id)).await?;
    Ok(Json(created))
}

/// PUT /api/v1/ai-settings
pub async fn handle_update_ai_settings(
    State(state): State<AppState>,
    Json(req): Json<UpdateAiSettingsRequest>,
) -> Result<Json<AiSettingsRow>, AppError> {
    fetch_account(&state.db, req.user_id).await?;
    let current = fetch_settings(&state.db, req.user_id)
        .await?
        .unwrap_or_else(|| AiSettingsRow::defaults_for(req.user_id));

    let merged = merge_settings(current, req)?;
    Ok(Json(upsert_settings(&state.db, &merged).await?))
}

fn merge_settings(
    mut current: AiSettingsRow,
    req: UpdateAiSettingsRequest,
) -> Result<AiSettingsRow, AppError> {
    if let Some(temperature) = req.temperature {
        if !(0.0..=MAX_TEMPERATURE).contains(&temperature) {
            return Err(AppError::Validation(format!(
                "temperature must be between 0 and {MAX_TEMPERATURE}"
            )));
        }
        current.temperature = temperature;
    }
    if let Some(model) = req.model_name {
        let model = model.trim();
        if model.is_empty() {
            return Err(AppError::Validation("model_name cannot be empty".to_string()));
        }
        current.model_name = model.to_string();
    }
    if let Some(role) = req.ai_role {
        current.ai_role = role;
    }
    if let Some(prompt) = req.system_prompt {
        current.system_prompt = prompt;
    }
    Ok(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ai_settings::{DEFAULT_MODEL_NAME, DEFAULT_SYSTEM_PROMPT};

    fn request(user_id: Uuid) -> UpdateAiSettingsRequest {
        UpdateAiSettingsRequest {
            user_id,
            ai_role: None,
            system_prompt: None,
            model_name: None,
            temperature: None,
        }
    }

    #[test]
    fn test_merge_keeps_unset_fields() {
        let user_id = Uuid::new_v4();
        let merged = merge_settings(
            AiSettingsRow::defaults_for(user_id),
            UpdateAiSettingsRequest {
                model_name: Some(" GigaChat ".to_string()),
                ..request(user_id)
            },
        )
        .unwrap();

        assert_eq!(merged.model_name, "GigaChat");
        assert_eq!(merged.system_prompt, DEFAULT_SYSTEM_PROMPT);
        assert_eq!(merged.temperature, 0.7);
    }

    #[test]
    fn test_merge_rejects_out_of_range_temperature() {
        let user_id = Uuid::new_v4();
        let result = merge_settings(
            AiSettingsRow::defaults_for(user_id),
            UpdateAiSettingsRequest {
                temperature: Some(2.5),
                ..request(user_id)
            },
        );
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_merge_rejects_blank_model() {
        let user_id = Uuid::new_v4();
        let result = merge_settings(
            AiSettingsRow::defaults_for(user_id),
            UpdateAiSettingsRequest {
                model_name: Some("   ".to_string()),
                ..request(user_id)
            },
        );
        assert!(result.is_err());
        assert_eq!(
            AiSettingsRow::defaults_for(user_id).model_name,
            DEFAULT_MODEL_NAME
        );
    }
}
