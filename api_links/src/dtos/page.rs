use db::models::page::Page;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct PageUpsertRequest {
    pub html: String,
    pub css: String,
}

#[derive(Debug, Serialize)]
pub struct PageResponse {
    pub page: Page,
}
