use chrono::{DateTime, Utc};
use db::models::link::{Link, LinkWithStats};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct ShortenRequest {
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct ShortenResponse {
    pub short_code: String,
    pub original_url: String,
    pub created_at: DateTime<Utc>,
}

impl From<Link> for ShortenResponse {
    fn from(link: Link) -> Self {
        ShortenResponse {
            short_code: link.short_code,
            original_url: link.original_url,
            created_at: link.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LinkListQuery {
    #[serde(default)]
    pub deactivated: bool,
}

#[derive(Debug, Serialize)]
pub struct LinkListResponse {
    pub links: Vec<LinkWithStats>,
}

#[derive(Debug, Serialize)]
pub struct LinkToggleResponse {
    pub id: Uuid,
    pub is_active: bool,
}
