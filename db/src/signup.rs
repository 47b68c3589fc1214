use common::error::{AppError, Res};
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    dtos::signup::SignupCreateRequest,
    models::signup::{EmailSignup, OwnerSignup},
};

pub async fn insert_signup<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    data: SignupCreateRequest,
) -> Res<EmailSignup> {
    sqlx::query_as::<_, EmailSignup>(
        r#"
        INSERT INTO email_signups (email, link_id, user_id)
        VALUES ($1, $2, $3)
        RETURNING *
        "#,
    )
    .bind(data.email)
    .bind(data.link_id)
    .bind(data.user_id)
    .fetch_one(executor)
    .await
    .map_err(AppError::from)
}

/// Signups captured through any link the owner created.
pub async fn count_signups_by_owner<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    owner_id: Uuid,
) -> Res<i64> {
    sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM email_signups s
        JOIN links l ON l.id = s.link_id
        WHERE l.user_id = $1
        "#,
    )
    .bind(owner_id)
    .fetch_one(executor)
    .await
    .map_err(AppError::from)
}

/// Newest first. `limit = None` returns every row.
pub async fn list_signups_by_owner<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    owner_id: Uuid,
    limit: Option<i64>,
) -> Res<Vec<OwnerSignup>> {
    sqlx::query_as::<_, OwnerSignup>(
        r#"
        SELECT s.id, s.email, s.link_id, l.short_code, s.created_at
        FROM email_signups s
        JOIN links l ON l.id = s.link_id
        WHERE l.user_id = $1
        ORDER BY s.created_at DESC
        LIMIT $2
        "#,
    )
    .bind(owner_id)
    .bind(limit)
    .fetch_all(executor)
    .await
    .map_err(AppError::from)
}
