use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct VacancyRow {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub description: String,
    pub required_skills: Option<String>,
    pub experience_level: Option<String>,
    pub salary_range: Option<String>,
    /// Skill name → importance, as entered by the recruiter.
    pub skill_weights: Option<Value>,
    pub created_at: DateTime<Utc>,
}
