use common::error::{AppError, Res};
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    dtos::subscription::{SubscriptionUpdate, SubscriptionUpsert},
    models::subscription::SubscriptionRecord,
};

pub async fn get_subscription_by_user_id<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    user_id: Uuid,
) -> Res<Option<SubscriptionRecord>> {
    sqlx::query_as::<_, SubscriptionRecord>("SELECT * FROM subscriptions WHERE user_id = $1")
        .bind(user_id)
        .fetch_optional(executor)
        .await
        .map_err(AppError::from)
}

/// Single-statement upsert keyed by `user_id`, so concurrent deliveries of the
/// same creation event converge on one row.
pub async fn upsert_subscription_by_user_id<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    user_id: Uuid,
    data: &SubscriptionUpsert,
) -> Res<SubscriptionRecord> {
    sqlx::query_as::<_, SubscriptionRecord>(
        r#"
        INSERT INTO subscriptions (
            user_id, stripe_customer_id, stripe_subscription_id, stripe_price_id,
            plan, status, current_period_end, cancel_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        ON CONFLICT (user_id) DO UPDATE SET
            stripe_customer_id = EXCLUDED.stripe_customer_id,
            stripe_subscription_id = EXCLUDED.stripe_subscription_id,
            stripe_price_id = EXCLUDED.stripe_price_id,
            plan = EXCLUDED.plan,
            status = EXCLUDED.status,
            current_period_end = EXCLUDED.current_period_end,
            cancel_at = EXCLUDED.cancel_at,
            updated_at = NOW()
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(&data.stripe_customer_id)
    .bind(&data.stripe_subscription_id)
    .bind(&data.stripe_price_id)
    .bind(&data.plan)
    .bind(&data.status)
    .bind(data.current_period_end)
    .bind(data.cancel_at)
    .fetch_one(executor)
    .await
    .map_err(AppError::from)
}

/// Returns `None` when no row carries this Stripe subscription id.
pub async fn update_subscription_by_stripe_id<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    stripe_subscription_id: &str,
    data: &SubscriptionUpdate,
) -> Res<Option<SubscriptionRecord>> {
    sqlx::query_as::<_, SubscriptionRecord>(
        r#"
        UPDATE subscriptions SET
            stripe_price_id = $2,
            plan = $3,
            status = $4,
            current_period_end = $5,
            cancel_at = $6,
            updated_at = NOW()
        WHERE stripe_subscription_id = $1
        RETURNING *
        "#,
    )
    .bind(stripe_subscription_id)
    .bind(&data.stripe_price_id)
    .bind(&data.plan)
    .bind(&data.status)
    .bind(data.current_period_end)
    .bind(data.cancel_at)
    .fetch_optional(executor)
    .await
    .map_err(AppError::from)
}

pub async fn update_subscription_status_by_stripe_id<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    stripe_subscription_id: &str,
    status: &str,
) -> Res<Option<SubscriptionRecord>> {
    sqlx::query_as::<_, SubscriptionRecord>(
        r#"
        UPDATE subscriptions SET status = $2, updated_at = NOW()
        WHERE stripe_subscription_id = $1
        RETURNING *
        "#,
    )
    .bind(stripe_subscription_id)
    .bind(status)
    .fetch_optional(executor)
    .await
    .map_err(AppError::from)
}
