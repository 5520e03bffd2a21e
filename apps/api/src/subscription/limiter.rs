//! Usage limiter: decides whether an account may process one more resume.
//!
//! Pure over the caller-supplied account and clock. Persisting the mutated
//! counter is the caller's job (see `record_usage_in_db`).

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::models::account::AccountRow;
use crate::subscription::tiers::{SubscriptionTier, TierTable};

const SECONDS_PER_DAY: i64 = 86_400;

/// Snapshot of an account's plan, quota and trial state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubscriptionStatus {
    pub tier: SubscriptionTier,
    pub tier_name: String,
    pub limit: i64,
    pub used: i64,
    pub days_left: i64,
    pub is_trial: bool,
    pub is_expired: bool,
    pub can_upload: bool,
}

pub struct UsageLimiter<'a> {
    tiers: &'a TierTable,
}

impl<'a> UsageLimiter<'a> {
    pub fn new(tiers: &'a TierTable) -> Self {
        Self { tiers }
    }

    /// Days left in the trial. Trial length is always FREE's `trial_days`,
    /// whatever tier the account is on now.
    pub fn days_left(&self, account: &AccountRow, now: DateTime<Utc>) -> i64 {
        let Some(trial_start) = account.trial_start_date else {
            return 0;
        };
        let elapsed_days = (now - trial_start)
            .num_seconds()
            .div_euclid(SECONDS_PER_DAY);
        (self.tiers.free().trial_days - elapsed_days).max(0)
    }

    pub fn status(&self, account: &AccountRow, now: DateTime<Utc>) -> SubscriptionStatus {
        let (tier, definition) = self.tiers.resolve(&account.subscription_tier);
        let days_left = self.days_left(account, now);

        let trial_over = definition.is_trial && days_left <= 0;
        let subscription_over = account
            .subscription_end_date
            .is_some_and(|end| end < now);
        let is_expired = trial_over || subscription_over;

        let used = account.resumes_used_current_period;
        SubscriptionStatus {
            tier,
            tier_name: definition.display_name.clone(),
            limit: definition.resume_limit,
            used,
            days_left,
            is_trial: definition.is_trial,
            is_expired,
            can_upload: !is_expired && used < definition.resume_limit,
        }
    }

    pub fn can_upload(&self, account: &AccountRow, now: DateTime<Utc>) -> bool {
        self.status(account, now).can_upload
    }

    /// How many more resumes fit in the current period. Zero when blocked.
    pub fn remaining(&self, account: &AccountRow, now: DateTime<Utc>) -> i64 {
        let status = self.status(account, now);
        if status.can_upload {
            status.limit - status.used
        } else {
            0
        }
    }
}

/// Consumes one unit. Never clamps: callers check `can_upload` first.
pub fn record_usage(account: &mut AccountRow) {
    account.resumes_used_current_period += 1;
}

/// Persists `count` consumed units with an atomic increment so concurrent
/// requests never lose updates. Returns the stored counter.
pub async fn record_usage_in_db(
    tx: &mut Transaction<'_, Postgres>,
    account_id: Uuid,
    count: i64,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar(
        r#"
        UPDATE accounts
        SET resumes_used_current_period = resumes_used_current_period + $1
        WHERE id = $2
        RETURNING resumes_used_current_period
        "#,
    )
    .bind(count)
    .bind(account_id)
    .fetch_one(&mut **tx)
    .await
}
