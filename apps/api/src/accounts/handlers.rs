use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::accounts::store::fetch_account;
use crate::errors::AppError;
use crate::models::account::AccountRow;
use crate::state::AppState;
use crate::subscription::tiers::SubscriptionTier;

#[derive(Debug, Deserialize)]
pub struct CreateAccountRequest {
    pub email: String,
    pub full_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChangeSubscriptionRequest {
    pub tier: SubscriptionTier,
    pub subscription_end_date: Option<DateTime<Utc>>,
}

/// POST /api/v1/accounts
///
/// New accounts start on FREE with the trial clock running from now.
pub async fn handle_create_account(
    State(state): State<AppState>,
    Json(req): Json<CreateAccountRequest>,
) -> Result<(StatusCode, Json<AccountRow>), AppError> {
    let email = normalize_email(&req.email)?;

    let existing: Option<Uuid> = sqlx::query_scalar("SELECT id FROM accounts WHERE email = $1")
        .bind(&email)
        .fetch_optional(&state.db)
        .await?;
    if existing.is_some() {
        return Err(AppError::Conflict(format!(
            "An account with email {email} already exists"
        )));
    }

    let account = sqlx::query_as::<_, AccountRow>(
        r#"
        INSERT INTO accounts (id, email, full_name, subscription_tier, trial_start_date)
        VALUES ($1, $2, $3, $4, NOW())
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&email)
    .bind(req.full_name.as_deref().map(str::trim).filter(|n| !n.is_empty()))
    .bind(SubscriptionTier::Free.as_str())
    .fetch_one(&state.db)
    .await
    .map_err(|e| conflict_on_duplicate_email(e, &email))?;

    info!("Created account {} ({})", account.id, account.email);
    Ok((StatusCode::CREATED, Json(account)))
}

/// GET /api/v1/accounts/:id
pub async fn handle_get_account(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<AccountRow>, AppError> {
    Ok(Json(fetch_account(&state.db, id).await?))
}

/// PUT /api/v1/accounts/:id/subscription
///
/// Switches the plan. The usage counter is left alone.
pub async fn handle_change_subscription(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<ChangeSubscriptionRequest>,
) -> Result<Json<AccountRow>, AppError> {
    let account = sqlx::query_as::<_, AccountRow>(
        r#"
        UPDATE accounts
        SET subscription_tier = $1, subscription_end_date = $2
        WHERE id = $3
        RETURNING *
        "#,
    )
    .bind(req.tier.as_str())
    .bind(req.subscription_end_date)
    .bind(id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Account {id} not found")))?;

    info!("Account {id} moved to tier {}", req.tier);
    Ok(Json(account))
}

/// A concurrent create can pass the lookup above and still lose the race on
/// the UNIQUE constraint.
fn conflict_on_duplicate_email(err: sqlx::Error, email: &str) -> AppError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            AppError::Conflict(format!("An account with email {email} already exists"))
        }
        _ => AppError::Database(err),
    }
}

fn normalize_email(raw: &str) -> Result<String, AppError> {
    let email = raw.trim().to_lowercase();
    let valid = email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
    if valid {
        Ok(email)
    } else {
        Err(AppError::Validation(format!("'{raw}' is not a valid email")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::error::{DatabaseError, ErrorKind};

    #[test]
    fn test_normalize_email() {
        assert_eq!(
            normalize_email("  HR@Example.COM ").unwrap(),
            "hr@example.com"
        );
        assert!(normalize_email("no-at-sign").is_err());
        assert!(normalize_email("@example.com").is_err());
        assert!(normalize_email("hr@localhost").is_err());
    }

    /// Stand-in for the driver error Postgres raises on a constraint hit.
    #[derive(Debug)]
    struct ConstraintError(ErrorKind);

    impl std::fmt::Display for ConstraintError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str("constraint violated")
        }
    }

    impl std::error::Error for ConstraintError {}

    impl DatabaseError for ConstraintError {
        fn message(&self) -> &str {
            "constraint violated"
        }

        fn as_error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn std::error::Error + Send + Sync + 'static> {
            self
        }

        fn kind(&self) -> ErrorKind {
            match self.0 {
                ErrorKind::UniqueViolation => ErrorKind::UniqueViolation,
                _ => ErrorKind::Other,
            }
        }
    }

    #[test]
    fn test_duplicate_email_race_maps_to_conflict() {
        let err = sqlx::Error::Database(Box::new(ConstraintError(ErrorKind::UniqueViolation)));
        let mapped = conflict_on_duplicate_email(err, "hr@example.com");
        assert!(matches!(mapped, AppError::Conflict(msg) if msg.contains("hr@example.com")));
    }

    #[test]
    fn test_other_database_errors_stay_database_errors() {
        let err = sqlx::Error::Database(Box::new(ConstraintError(ErrorKind::Other)));
        assert!(matches!(
            conflict_on_duplicate_email(err, "hr@example.com"),
            AppError::Database(_)
        ));
        assert!(matches!(
            conflict_on_duplicate_email(sqlx::Error::RowNotFound, "hr@example.com"),
            AppError::Database(_)
        ));
    }
}
