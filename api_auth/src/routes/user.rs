use std::sync::Arc;

use actix_web::{Responder, get, patch, post, web};
use common::{error::Res, http::Success, jwt::JwtClaims};
use sqlx::PgPool;

use crate::{dtos::auth::UpdateMeRequest, services};

/// Returns the signed-in user's profile.
///
/// # Output
/// - `{ "id", "email", "name", "image", "created_at", "updated_at", "deleted_at" }`
/// - 404 when the account was deleted
///
/// # Frontend Example
/// ```javascript
/// const response = await fetch('/api/dashboard/me', {
///   headers: { 'Authorization': `Bearer ${localStorage.getItem('authToken')}` }
/// });
/// const user = await response.json();
/// ```
#[get("")]
pub async fn get_me(claims: web::ReqData<JwtClaims>, pool: web::Data<Arc<PgPool>>) -> Res<impl Responder> {
    let user = services::user::get_user_by_id(&pool, claims.user_id).await?;
    Success::ok(user)
}

/// Renames the signed-in user. Body: `{ "name": "Ada Lovelace" }`.
#[patch("")]
pub async fn patch_me(
    claims: web::ReqData<JwtClaims>,
    req: web::Json<UpdateMeRequest>,
    pool: web::Data<Arc<PgPool>>,
) -> Res<impl Responder> {
    let user = services::user::rename_user(&pool, claims.user_id, &req.name).await?;
    Success::ok(user)
}

/// Soft-deletes the account. Signing in again restores it.
#[post("/delete")]
pub async fn post_delete_me(
    claims: web::ReqData<JwtClaims>,
    pool: web::Data<Arc<PgPool>>,
) -> Res<impl Responder> {
    services::user::delete_user(&pool, claims.user_id).await?;
    Success::no_content()
}
