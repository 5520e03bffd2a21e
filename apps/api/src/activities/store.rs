use serde_json::{json, Value};
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use crate::models::activity::ActivityRow;
use crate::models::candidate::{CandidateRow, CandidateStatus};
use crate::models::vacancy::VacancyRow;

pub const VACANCY_CREATED: &str = "VACANCY_CREATED";
pub const CANDIDATES_ADDED: &str = "CANDIDATES_ADDED";
pub const CANDIDATE_STATUS_CHANGED: &str = "CANDIDATE_STATUS_CHANGED";

/// An activity entry before it is stored.
#[derive(Debug, Clone, PartialEq)]
pub struct NewActivity {
    pub action_type: String,
    pub description: String,
    pub entity_type: Option<String>,
    pub entity_id: Option<String>,
    pub entity_name: Option<String>,
    pub metadata: Option<Value>,
    pub created_by: Option<String>,
}

impl NewActivity {
    pub fn vacancy_created(vacancy: &VacancyRow, created_by: &str) -> Self {
        Self {
            action_type: VACANCY_CREATED.to_string(),
            description: format!("Создана вакансия «{}»", vacancy.title),
            entity_type: Some("vacancy".to_string()),
            entity_id: Some(vacancy.id.to_string()),
            entity_name: Some(vacancy.title.clone()),
            metadata: None,
            created_by: Some(created_by.to_string()),
        }
    }

    /// One entry per intake call, however many resumes it carried.
    pub fn candidates_added(vacancy_id: Uuid, filenames: &[&str], created_by: &str) -> Self {
        let description = match filenames {
            [single] => format!("Загружено резюме {single}"),
            _ => format!("Добавлено резюме: {}", filenames.len()),
        };
        Self {
            action_type: CANDIDATES_ADDED.to_string(),
            description,
            entity_type: Some("vacancy".to_string()),
            entity_id: Some(vacancy_id.to_string()),
            entity_name: None,
            metadata: Some(json!({ "count": filenames.len(), "filenames": filenames })),
            created_by: Some(created_by.to_string()),
        }
    }

    pub fn status_changed(candidate: &CandidateRow, from: &str, to: CandidateStatus) -> Self {
        Self {
            action_type: CANDIDATE_STATUS_CHANGED.to_string(),
            description: format!("{}: {} → {}", candidate.filename, from, to.as_str()),
            entity_type: Some("candidate".to_string()),
            entity_id: Some(candidate.id.to_string()),
            entity_name: Some(candidate.filename.clone()),
            metadata: Some(json!({ "from": from, "to": to.as_str() })),
            created_by: None,
        }
    }
}

/// Stores an entry. Takes any executor so intake can log inside its transaction.
pub async fn record_activity<'e, E>(
    executor: E,
    owner_id: Uuid,
    activity: &NewActivity,
) -> Result<ActivityRow, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, ActivityRow>(
        r#"
        INSERT INTO activity_log
            (id, owner_id, action_type, description, entity_type,
             entity_id, entity_name, metadata, created_by)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(owner_id)
    .bind(&activity.action_type)
    .bind(&activity.description)
    .bind(&activity.entity_type)
    .bind(&activity.entity_id)
    .bind(&activity.entity_name)
    .bind(&activity.metadata)
    .bind(&activity.created_by)
    .fetch_one(executor)
    .await
}

/// Newest first.
pub async fn list_activities(
    pool: &PgPool,
    owner_id: Uuid,
    offset: i64,
    limit: i64,
) -> Result<Vec<ActivityRow>, sqlx::Error> {
    sqlx::query_as::<_, ActivityRow>(
        r#"
        SELECT * FROM activity_log
        WHERE owner_id = $1
        ORDER BY created_at DESC
        OFFSET $2 LIMIT $3
        "#,
    )
    .bind(owner_id)
    .bind(offset)
    .bind(limit)
    .fetch_all(pool)
    .await
}
