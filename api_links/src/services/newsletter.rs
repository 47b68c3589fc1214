use common::error::{AppError, Res};
use db::{dtos::signup::SignupCreateRequest, models::signup::EmailSignup};
use limiter::enforcer::LimitEnforcer;
use sqlx::PgPool;

use crate::{dtos::newsletter::NewsletterRequest, misc::validate};

/// Stores a visitor's email. When it arrives through a link with an owner,
/// the signup is attributed to that owner and counts against their plan.
pub async fn capture_signup(
    pool: &PgPool,
    enforcer: &LimitEnforcer,
    req: NewsletterRequest,
) -> Res<EmailSignup> {
    let email = validate::normalize_email(&req.email)?;

    let owner_id = match req.link_id {
        Some(link_id) => db::link::get_link_by_id(pool, link_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Link not found".to_string()))?
            .user_id,
        None => None,
    };

    if let Some(owner_id) = owner_id {
        enforcer.check_signup_capture(pool, owner_id).await?;
    }

    db::signup::insert_signup(
        pool,
        SignupCreateRequest {
            email,
            link_id: req.link_id,
            user_id: owner_id,
        },
    )
    .await
}
