use common::error::{AppError, Res};
use db::models::page::Page;
use limiter::enforcer::LimitEnforcer;
use sqlx::PgPool;
use uuid::Uuid;

use crate::services::link::get_owned_link;

pub async fn get_page(pool: &PgPool, link_id: Uuid) -> Res<Page> {
    db::page::get_page_by_link_id(pool, link_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Page not found".to_string()))
}

/// Creates or replaces the landing page of an owned link. Returns the page
/// and whether it was newly created. The page limit only applies on create.
pub async fn save_page(
    pool: &PgPool,
    enforcer: &LimitEnforcer,
    user_id: Uuid,
    link_id: Uuid,
    html: &str,
    css: &str,
) -> Res<(Page, bool)> {
    if html.trim().is_empty() || css.trim().is_empty() {
        return Err(AppError::BadRequest("HTML and CSS are required".to_string()));
    }

    let link = get_owned_link(pool, link_id, user_id).await?;
    let existing = db::page::get_page_by_link_id(pool, link.id).await?;
    if existing.is_none() {
        enforcer.check_page_creation(pool, user_id).await?;
    }

    let page = db::page::upsert_page(pool, link.id, html, css).await?;
    Ok((page, existing.is_none()))
}

pub async fn delete_page(pool: &PgPool, user_id: Uuid, link_id: Uuid) -> Res<()> {
    let link = get_owned_link(pool, link_id, user_id).await?;
    if db::page::delete_page(pool, link.id).await? {
        Ok(())
    } else {
        Err(AppError::NotFound("Page not found".to_string()))
    }
}
