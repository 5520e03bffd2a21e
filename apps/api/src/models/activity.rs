use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ActivityRow {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub action_type: String,
    pub description: String,
    pub entity_type: Option<String>,
    pub entity_id: Option<String>,
    pub entity_name: Option<String>,
    pub metadata: Option<Value>,
    /// Email of the account that acted; `None` for entries the service records itself.
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
}
