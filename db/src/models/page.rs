use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct Page {
    pub id: Uuid,
    pub link_id: Uuid,
    pub html: String,
    pub css: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
