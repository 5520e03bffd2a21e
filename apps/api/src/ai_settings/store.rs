use sqlx::PgPool;
use uuid::Uuid;

use crate::models::ai_settings::AiSettingsRow;

pub async fn fetch_settings(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Option<AiSettingsRow>, sqlx::Error> {
    sqlx::query_as::<_, AiSettingsRow>("SELECT * FROM ai_settings WHERE user_id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

/// Saved settings, or the defaults when the account never saved any.
pub async fn fetch_or_default(pool: &PgPool, user_id: Uuid) -> Result<AiSettingsRow, sqlx::Error> {
    Ok(fetch_settings(pool, user_id)
        .await?
        .unwrap_or_else(|| AiSettingsRow::defaults_for(user_id)))
}

pub async fn upsert_settings(
    pool: &PgPool,
    settings: &AiSettingsRow,
) -> Result<AiSettingsRow, sqlx::Error> {
    sqlx::query_as::<_, AiSettingsRow>(
        r#"
        INSERT INTO ai_settings (id, user_id, ai_role, system_prompt, model_name, temperature)
        VALUES ($1, $2, $3, $4, $5, $6)
        ON CONFLICT (user_id) DO UPDATE
        SET ai_role = EXCLUDED.ai_role,
            system_prompt = EXCLUDED.system_prompt,
            model_name = EXCLUDED.model_name,
            temperature = EXCLUDED.temperature
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(settings.user_id)
    .bind(&settings.ai_role)
    .bind(&settings.system_prompt)
    .bind(&settings.model_name)
    .bind(settings.temperature)
    .fetch_one(pool)
    .await
}
