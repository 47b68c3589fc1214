use common::error::Res;
use limiter::enforcer::LimitEnforcer;
use sqlx::PgPool;
use uuid::Uuid;

use crate::dtos::signup::SignupListResponse;

/// Signups across the owner's links, newest first. Plans with a signup ceiling
/// only see that many rows.
pub async fn list_signups(
    pool: &PgPool,
    enforcer: &LimitEnforcer,
    user_id: Uuid,
) -> Res<SignupListResponse> {
    let plan = enforcer.plan_for(pool, user_id).await?;
    let visible = enforcer.catalog().limits(plan).email_signups.map(i64::from);

    let total = db::signup::count_signups_by_owner(pool, user_id).await?;
    let signups = db::signup::list_signups_by_owner(pool, user_id, visible).await?;

    Ok(SignupListResponse {
        truncated: visible.is_some_and(|limit| total > limit),
        signups,
        plan,
        total,
    })
}
