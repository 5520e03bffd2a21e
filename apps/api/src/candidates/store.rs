use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::candidate::{CandidateRow, CandidateStatus};

/// Loads a candidate whose vacancy belongs to `owner_id`.
pub async fn fetch_owned_candidate(
    pool: &PgPool,
    candidate_id: Uuid,
    owner_id: Uuid,
) -> Result<CandidateRow, AppError> {
    sqlx::query_as::<_, CandidateRow>(
        r#"
        SELECT c.*
        FROM candidates c
        JOIN vacancies v ON v.id = c.vacancy_id
        WHERE c.id = $1 AND v.owner_id = $2
        "#,
    )
    .bind(candidate_id)
    .bind(owner_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Candidate {candidate_id} not found")))
}

pub async fn insert_candidate(
    tx: &mut Transaction<'_, Postgres>,
    vacancy_id: Uuid,
    filename: &str,
    content: &str,
) -> Result<CandidateRow, sqlx::Error> {
    sqlx::query_as::<_, CandidateRow>(
        r#"
        INSERT INTO candidates (id, vacancy_id, filename, content, status)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(vacancy_id)
    .bind(filename)
    .bind(content)
    .bind(CandidateStatus::New.as_str())
    .fetch_one(&mut **tx)
    .await
}

/// Writes the analysis fields of `candidate` back to its row.
pub async fn save_analysis(
    pool: &PgPool,
    candidate: &CandidateRow,
) -> Result<CandidateRow, sqlx::Error> {
    sqlx::query_as::<_, CandidateRow>(
        r#"
        UPDATE candidates
        SET score = $1, skills_match = $2, missing_skills = $3, summary = $4,
            recommendation = $5, screening_questions = $6
        WHERE id = $7
        RETURNING *
        "#,
    )
    .bind(candidate.score)
    .bind(&candidate.skills_match)
    .bind(&candidate.missing_skills)
    .bind(&candidate.summary)
    .bind(&candidate.recommendation)
    .bind(&candidate.screening_questions)
    .bind(candidate.id)
    .fetch_one(pool)
    .await
}
