use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::Value;
use tracing::info;
use uuid::Uuid;

use crate::accounts::store::fetch_account;
use crate::activities::store::{record_activity, NewActivity};
use crate::errors::AppError;
use crate::models::vacancy::VacancyRow;
use crate::routes::{page_bounds, UserIdQuery};
use crate::state::AppState;
use crate::vacancies::store::fetch_owned_vacancy;

#[derive(Debug, Deserialize)]
pub struct CreateVacancyRequest {
    pub user_id: Uuid,
    pub title: String,
    pub description: String,
    pub required_skills: Option<String>,
    pub experience_level: Option<String>,
    pub salary_range: Option<String>,
    pub skill_weights: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct ListVacanciesQuery {
    pub user_id: Uuid,
    #[serde(default)]
    pub skip: i64,
    pub limit: Option<i64>,
}

/// POST /api/v1/vacancies
pub async fn handle_create_vacancy(
    State(state): State<AppState>,
    Json(req): Json<CreateVacancyRequest>,
) -> Result<(StatusCode, Json<VacancyRow>), AppError> {
    if req.title.trim().is_empty() {
        return Err(AppError::Validation("title cannot be empty".to_string()));
    }
    if req.description.trim().is_empty() {
        return Err(AppError::Validation(
            "description cannot be empty".to_string(),
        ));
    }
    if let Some(weights) = &req.skill_weights {
        validate_skill_weights(weights)?;
    }
    let account = fetch_account(&state.db, req.user_id).await?;

    let vacancy = sqlx::query_as::<_, VacancyRow>(
        r#"
        INSERT INTO vacancies
            (id, owner_id, title, description, required_skills,
             experience_level, salary_range, skill_weights)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(req.user_id)
    .bind(req.title.trim())
    .bind(&req.description)
    .bind(&req.required_skills)
    .bind(&req.experience_level)
    .bind(&req.salary_range)
    .bind(&req.skill_weights)
    .fetch_one(&state.db)
    .await?;

    record_activity(
        &state.db,
        account.id,
        &NewActivity::vacancy_created(&vacancy, &account.email),
    )
    .await?;

    info!("Created vacancy {} for account {}", vacancy.id, req.user_id);
    Ok((StatusCode::CREATED, Json(vacancy)))
}

/// GET /api/v1/vacancies
pub async fn handle_list_vacancies(
    State(state): State<AppState>,
    Query(params): Query<ListVacanciesQuery>,
) -> Result<Json<Vec<VacancyRow>>, AppError> {
    let (offset, limit) = page_bounds(params.skip, params.limit);
    let vacancies = sqlx::query_as::<_, VacancyRow>(
        r#"
        SELECT * FROM vacancies
        WHERE owner_id = $1
        ORDER BY created_at DESC
        OFFSET $2 LIMIT $3
        "#,
    )
    .bind(params.user_id)
    .bind(offset)
    .bind(limit)
    .fetch_all(&state.db)
    .await?;
    Ok(Json(vacancies))
}

/// GET /api/v1/vacancies/:id
pub async fn handle_get_vacancy(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<VacancyRow>, AppError> {
    Ok(Json(
        fetch_owned_vacancy(&state.db, id, params.user_id).await?,
    ))
}

/// DELETE /api/v1/vacancies/:id
///
/// Candidates and their chats go with it (ON DELETE CASCADE).
pub async fn handle_delete_vacancy(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
) -> Result<StatusCode, AppError> {
    let deleted = sqlx::query("DELETE FROM vacancies WHERE id = $1 AND owner_id = $2")
        .bind(id)
        .bind(params.user_id)
        .execute(&state.db)
        .await?
        .rows_affected();
    if deleted == 0 {
        return Err(AppError::NotFound(format!("Vacancy {id} not found")));
    }
    info!("Deleted vacancy {id}");
    Ok(StatusCode::NO_CONTENT)
}

/// Skill weights must be an object of skill name → non-negative number.
fn validate_skill_weights(weights: &Value) -> Result<(), AppError> {
    let map = weights.as_object().ok_or_else(|| {
        AppError::Validation("skill_weights must be an object".to_string())
    })?;
    for (skill, weight) in map {
        match weight.as_f64() {
            Some(w) if w >= 0.0 => {}
            _ => {
                return Err(AppError::Validation(format!(
                    "weight for '{skill}' must be a non-negative number"
                )))
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_skill_weights_validation() {
        assert!(validate_skill_weights(&json!({"Rust": 5, "SQL": 2.5})).is_ok());
        assert!(validate_skill_weights(&json!({"Rust": -1})).is_err());
        assert!(validate_skill_weights(&json!({"Rust": "high"})).is_err());
        assert!(validate_skill_weights(&json!(["Rust"])).is_err());
    }
}
