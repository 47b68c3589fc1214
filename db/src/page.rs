use common::error::{AppError, Res};
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::models::page::Page;

pub async fn get_page_by_link_id<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    link_id: Uuid,
) -> Res<Option<Page>> {
    sqlx::query_as::<_, Page>("SELECT * FROM pages WHERE link_id = $1")
        .bind(link_id)
        .fetch_optional(executor)
        .await
        .map_err(AppError::from)
}

pub async fn upsert_page<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    link_id: Uuid,
    html: &str,
    css: &str,
) -> Res<Page> {
    sqlx::query_as::<_, Page>(
        r#"
        INSERT INTO pages (link_id, html, css)
        VALUES ($1, $2, $3)
        ON CONFLICT (link_id) DO UPDATE SET
            html = EXCLUDED.html,
            css = EXCLUDED.css,
            updated_at = NOW()
        RETURNING *
        "#,
    )
    .bind(link_id)
    .bind(html)
    .bind(css)
    .fetch_one(executor)
    .await
    .map_err(AppError::from)
}

pub async fn delete_page<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    link_id: Uuid,
) -> Res<bool> {
    let result = sqlx::query("DELETE FROM pages WHERE link_id = $1")
        .bind(link_id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn count_pages_by_owner<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    owner_id: Uuid,
) -> Res<i64> {
    sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM pages p
        JOIN links l ON l.id = p.link_id
        WHERE l.user_id = $1
        "#,
    )
    .bind(owner_id)
    .fetch_one(executor)
    .await
    .map_err(AppError::from)
}
