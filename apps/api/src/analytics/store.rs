use std::collections::BTreeMap;

use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

const TOP_SKILLS: i64 = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyticsSummary {
    pub active_vacancies: i64,
    pub total_candidates: i64,
    /// Mean analysis score over all candidates, two decimals; 0 when there are none.
    pub avg_ai_score: f64,
    pub candidates_by_status: BTreeMap<String, i64>,
    /// Most frequent matched skills across analyzed candidates.
    pub top_skills: Vec<String>,
}

pub async fn fetch_summary(pool: &PgPool, owner_id: Uuid) -> Result<AnalyticsSummary, sqlx::Error> {
    let (active_vacancies, total_candidates, avg_score): (i64, i64, Option<f64>) =
        sqlx::query_as(
            r#"
            SELECT
                (SELECT COUNT(*) FROM vacancies WHERE owner_id = $1),
                COUNT(c.id),
                AVG(c.score)
            FROM candidates c
            JOIN vacancies v ON v.id = c.vacancy_id
            WHERE v.owner_id = $1
            "#,
        )
        .bind(owner_id)
        .fetch_one(pool)
        .await?;

    let by_status: Vec<(String, i64)> = sqlx::query_as(
        r#"
        SELECT c.status, COUNT(*)
        FROM candidates c
        JOIN vacancies v ON v.id = c.vacancy_id
        WHERE v.owner_id = $1
        GROUP BY c.status
        "#,
    )
    .bind(owner_id)
    .fetch_all(pool)
    .await?;

    let top_skills: Vec<String> = sqlx::query_scalar(
        r#"
        SELECT skill
        FROM candidates c
        JOIN vacancies v ON v.id = c.vacancy_id
        CROSS JOIN LATERAL unnest(c.skills_match) AS skill
        WHERE v.owner_id = $1
        GROUP BY skill
        ORDER BY COUNT(*) DESC, skill ASC
        LIMIT $2
        "#,
    )
    .bind(owner_id)
    .bind(TOP_SKILLS)
    .fetch_all(pool)
    .await?;

    Ok(AnalyticsSummary {
        active_vacancies,
        total_candidates,
        avg_ai_score: round_score(avg_score),
        candidates_by_status: by_status.into_iter().collect(),
        top_skills,
    })
}

fn round_score(avg: Option<f64>) -> f64 {
    match avg {
        Some(v) if v.is_finite() => (v * 100.0).round() / 100.0,
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_score() {
        assert_eq!(round_score(None), 0.0);
        assert_eq!(round_score(Some(0.736)), 0.74);
        assert_eq!(round_score(Some(0.5)), 0.5);
        assert_eq!(round_score(Some(f64::NAN)), 0.0);
    }

    #[test]
    fn test_summary_serializes_flat() {
        let summary = AnalyticsSummary {
            active_vacancies: 2,
            total_candidates: 7,
            avg_ai_score: 0.71,
            candidates_by_status: [("NEW".to_string(), 5), ("SHORTLIST".to_string(), 2)]
                .into_iter()
                .collect(),
            top_skills: vec!["Rust".to_string()],
        };
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["active_vacancies"], 2);
        assert_eq!(json["avg_ai_score"], 0.71);
        assert_eq!(json["candidates_by_status"]["SHORTLIST"], 2);
        assert_eq!(json["top_skills"][0], "Rust");
    }
}
