use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct EmailSignup {
    pub id: Uuid,
    pub email: String,
    pub link_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Signup row as shown to the link owner, with the short code it came through.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct OwnerSignup {
    pub id: Uuid,
    pub email: String,
    pub link_id: Option<Uuid>,
    pub short_code: Option<String>,
    pub created_at: DateTime<Utc>,
}
