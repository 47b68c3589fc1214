use std::sync::Arc;

use actix_web::{Responder, get, web};
use common::{error::Res, http::Success, jwt::JwtClaims};
use limiter::enforcer::LimitEnforcer;
use sqlx::PgPool;

use crate::services;

/// Emails captured across the caller's links, newest first.
///
/// # Output
/// - `{ "signups": [...], "plan": "free", "total": 42, "truncated": true }`
///
/// On plans with a signup ceiling only that many rows are returned;
/// `total` still reports the full count.
#[get("/signups")]
pub async fn get_signups(
    claims: web::ReqData<JwtClaims>,
    pool: web::Data<Arc<PgPool>>,
    enforcer: web::Data<Arc<LimitEnforcer>>,
) -> Res<impl Responder> {
    let list = services::signup::list_signups(&pool, &enforcer, claims.user_id).await?;
    Success::ok(list)
}
