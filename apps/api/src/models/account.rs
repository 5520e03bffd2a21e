use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A recruiter account together with its subscription counters.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AccountRow {
    pub id: Uuid,
    pub email: String,
    pub full_name: Option<String>,
    pub subscription_tier: String,
    pub trial_start_date: Option<DateTime<Utc>>,
    pub subscription_end_date: Option<DateTime<Utc>>,
    pub resumes_used_current_period: i64,
    pub created_at: DateTime<Utc>,
}
