use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Link {
    pub id: Uuid,
    pub short_code: String,
    pub original_url: String,
    pub user_id: Option<Uuid>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// A link joined with its analytics counters.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct LinkWithStats {
    pub id: Uuid,
    pub short_code: String,
    pub original_url: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub click_count: i64,
    pub signup_count: i64,
    pub has_page: bool,
}
