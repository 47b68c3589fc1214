use common::error::{AppError, Res};
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::models::click::Click;

pub async fn insert_click<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    link_id: Uuid,
    owner_id: Option<Uuid>,
) -> Res<Click> {
    sqlx::query_as::<_, Click>(
        "INSERT INTO clicks (link_id, user_id) VALUES ($1, $2) RETURNING *",
    )
    .bind(link_id)
    .bind(owner_id)
    .fetch_one(executor)
    .await
    .map_err(AppError::from)
}
