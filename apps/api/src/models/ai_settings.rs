use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub const DEFAULT_AI_ROLE: &str = "Эксперт по подбору персонала";
pub const DEFAULT_SYSTEM_PROMPT: &str = "Вы - опытный HR-специалист с глубокими знаниями в области подбора персонала. \
Ваша задача - объективно оценивать кандидатов на соответствие требованиям вакансии и предоставлять практические рекомендации.";
pub const DEFAULT_MODEL_NAME: &str = "x-ai/grok-4.1-fast";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Per-account AI preferences. One row per account.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AiSettingsRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub ai_role: String,
    pub system_prompt: String,
    pub model_name: String,
    pub temperature: f32,
}

impl AiSettingsRow {
    /// Settings used for accounts that never saved their own.
    pub fn defaults_for(user_id: Uuid) -> Self {
        Self {
            id: Uuid::nil(),
            user_id,
            ai_role: DEFAULT_AI_ROLE.to_string(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            model_name: DEFAULT_MODEL_NAME.to_string(),
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}
