use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::account::AccountRow;

pub async fn fetch_account(pool: &PgPool, user_id: Uuid) -> Result<AccountRow, AppError> {
    sqlx::query_as::<_, AccountRow>("SELECT * FROM accounts WHERE id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Account {user_id} not found")))
}

/// Loads the account and holds its row lock until the transaction ends, so
/// concurrent uploads for one account check and consume quota one at a time.
pub async fn lock_account(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
) -> Result<AccountRow, AppError> {
    sqlx::query_as::<_, AccountRow>("SELECT * FROM accounts WHERE id = $1 FOR UPDATE")
        .bind(user_id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Account {user_id} not found")))
}
