use common::error::{AppError, Res};
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    dtos::link::LinkCreateRequest,
    models::link::{Link, LinkWithStats},
};

pub async fn exists_short_code<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    short_code: &str,
) -> Res<bool> {
    sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM links WHERE short_code = $1)")
        .bind(short_code)
        .fetch_one(executor)
        .await
        .map_err(AppError::from)
}

pub async fn insert_link<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    data: LinkCreateRequest,
) -> Res<Link> {
    sqlx::query_as::<_, Link>(
        r#"
        INSERT INTO links (short_code, original_url, user_id)
        VALUES ($1, $2, $3)
        RETURNING *
        "#,
    )
    .bind(data.short_code)
    .bind(data.original_url)
    .bind(data.user_id)
    .fetch_one(executor)
    .await
    .map_err(AppError::from)
}

/// Includes soft-deleted rows, callers decide how to treat `deleted_at`.
pub async fn get_link_by_short_code<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    short_code: &str,
) -> Res<Option<Link>> {
    sqlx::query_as::<_, Link>("SELECT * FROM links WHERE short_code = $1")
        .bind(short_code)
        .fetch_optional(executor)
        .await
        .map_err(AppError::from)
}

pub async fn get_link_by_id<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    link_id: Uuid,
) -> Res<Option<Link>> {
    sqlx::query_as::<_, Link>("SELECT * FROM links WHERE id = $1 AND deleted_at IS NULL")
        .bind(link_id)
        .fetch_optional(executor)
        .await
        .map_err(AppError::from)
}

pub async fn set_link_active<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    link_id: Uuid,
    is_active: bool,
) -> Res<Link> {
    sqlx::query_as::<_, Link>(
        r#"
        UPDATE links SET is_active = $2, updated_at = NOW()
        WHERE id = $1 AND deleted_at IS NULL
        RETURNING *
        "#,
    )
    .bind(link_id)
    .bind(is_active)
    .fetch_optional(executor)
    .await?
    .ok_or_else(|| AppError::NotFound("Link not found".to_string()))
}

pub async fn soft_delete_link<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    link_id: Uuid,
) -> Res<()> {
    sqlx::query("UPDATE links SET deleted_at = NOW(), updated_at = NOW() WHERE id = $1")
        .bind(link_id)
        .execute(executor)
        .await?;
    Ok(())
}

/// Counts every link the user ever created, deleted and deactivated ones included.
pub async fn count_links_by_user<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    user_id: Uuid,
) -> Res<i64> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM links WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(executor)
        .await
        .map_err(AppError::from)
}

pub async fn list_links_with_stats<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    user_id: Uuid,
    is_active: bool,
) -> Res<Vec<LinkWithStats>> {
    sqlx::query_as::<_, LinkWithStats>(
        r#"
        SELECT
            l.id,
            l.short_code,
            l.original_url,
            l.is_active,
            l.created_at,
            (SELECT COUNT(*) FROM clicks c WHERE c.link_id = l.id) AS click_count,
            (SELECT COUNT(*) FROM email_signups s WHERE s.link_id = l.id) AS signup_count,
            EXISTS(SELECT 1 FROM pages p WHERE p.link_id = l.id) AS has_page
        FROM links l
        WHERE l.user_id = $1 AND l.deleted_at IS NULL AND l.is_active = $2
        ORDER BY l.created_at DESC
        "#,
    )
    .bind(user_id)
    .bind(is_active)
    .fetch_all(executor)
    .await
    .map_err(AppError::from)
}
