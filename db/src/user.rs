use common::error::{AppError, Res};
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{dtos::user::UserSignInRequest, models::user::User};

pub async fn get_user_by_id<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    user_id: Uuid,
) -> Res<User> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1 AND deleted_at IS NULL")
        .bind(user_id)
        .fetch_optional(executor)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
}

/// Creates the user on first sign-in, otherwise refreshes the profile and
/// clears a previous soft delete.
pub async fn upsert_user_on_sign_in<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    data: UserSignInRequest,
) -> Res<User> {
    sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (email, name, image)
        VALUES ($1, $2, $3)
        ON CONFLICT (email) DO UPDATE SET
            name = COALESCE(users.name, EXCLUDED.name),
            image = COALESCE(EXCLUDED.image, users.image),
            deleted_at = NULL,
            updated_at = NOW()
        RETURNING *
        "#,
    )
    .bind(data.email)
    .bind(data.name)
    .bind(data.image)
    .fetch_one(executor)
    .await
    .map_err(AppError::from)
}

pub async fn update_user_name<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    user_id: Uuid,
    name: &str,
) -> Res<User> {
    sqlx::query_as::<_, User>(
        r#"
        UPDATE users SET name = $2, updated_at = NOW()
        WHERE id = $1 AND deleted_at IS NULL
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(name)
    .fetch_optional(executor)
    .await?
    .ok_or_else(|| AppError::NotFound("User not found".to_string()))
}

pub async fn soft_delete_user<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    user_id: Uuid,
) -> Res<bool> {
    let result = sqlx::query(
        "UPDATE users SET deleted_at = NOW(), updated_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
    )
    .bind(user_id)
    .execute(executor)
    .await?;
    Ok(result.rows_affected() > 0)
}
