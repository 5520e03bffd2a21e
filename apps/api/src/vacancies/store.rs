use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::vacancy::VacancyRow;

/// Loads a vacancy only if `owner_id` owns it. Someone else's vacancy is
/// reported as missing.
pub async fn fetch_owned_vacancy(
    pool: &PgPool,
    vacancy_id: Uuid,
    owner_id: Uuid,
) -> Result<VacancyRow, AppError> {
    sqlx::query_as::<_, VacancyRow>("SELECT * FROM vacancies WHERE id = $1 AND owner_id = $2")
        .bind(vacancy_id)
        .bind(owner_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Vacancy {vacancy_id} not found")))
}
