use std::sync::Arc;

use actix_web::{Responder, post, web};
use common::{error::Res, http::Success};
use limiter::enforcer::LimitEnforcer;
use sqlx::PgPool;

use crate::{
    dtos::newsletter::{NewsletterRequest, NewsletterResponse},
    services,
};

/// Captures a visitor email from the newsletter interstitial.
///
/// # Input
/// - `req`: `{ "email": "visitor@example.com", "link_id": "uuid" }`, `link_id` optional
///
/// # Output
/// - 201 `{ "success": true, "email": "visitor@example.com", "created_at": "..." }`
/// - 400 when the email is missing or malformed
/// - 403 when the link owner's plan has no signups left
#[post("/newsletter")]
pub async fn post_newsletter(
    req: web::Json<NewsletterRequest>,
    pool: web::Data<Arc<PgPool>>,
    enforcer: web::Data<Arc<LimitEnforcer>>,
) -> Res<impl Responder> {
    let signup = services::newsletter::capture_signup(&pool, &enforcer, req.into_inner()).await?;
    Success::created(NewsletterResponse {
        success: true,
        email: signup.email,
        created_at: signup.created_at,
    })
}
