use std::sync::Arc;

use actix_web::{HttpResponse, Responder, delete, get, post, web};
use common::{error::Res, http::Success, jwt::JwtClaims};
use limiter::enforcer::LimitEnforcer;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    dtos::page::{PageResponse, PageUpsertRequest},
    services,
};

/// Public fetch of a link's landing page.
#[get("/pages/{link_id}")]
pub async fn get_page(link_id: web::Path<Uuid>, pool: web::Data<Arc<PgPool>>) -> Res<impl Responder> {
    let page = services::page::get_page(&pool, link_id.into_inner()).await?;
    Success::ok(PageResponse { page })
}

/// Creates or replaces the landing page shown before an owned link redirects.
///
/// # Input
/// - `req`: `{ "html": "<h1>Hello</h1>", "css": "h1 { color: red; }" }`
///
/// # Output
/// - 201 `{ "page": {...} }` on create, 200 on update
/// - 403 when the link belongs to someone else or the page limit is reached
/// - 404 when the link does not exist
#[post("/pages/{link_id}")]
pub async fn post_page(
    claims: web::ReqData<JwtClaims>,
    link_id: web::Path<Uuid>,
    req: web::Json<PageUpsertRequest>,
    pool: web::Data<Arc<PgPool>>,
    enforcer: web::Data<Arc<LimitEnforcer>>,
) -> Res<HttpResponse> {
    let (page, created) = services::page::save_page(
        &pool,
        &enforcer,
        claims.user_id,
        link_id.into_inner(),
        &req.html,
        &req.css,
    )
    .await?;

    let body = PageResponse { page };
    Ok(if created {
        HttpResponse::Created().json(body)
    } else {
        HttpResponse::Ok().json(body)
    })
}

#[delete("/pages/{link_id}")]
pub async fn delete_page(
    claims: web::ReqData<JwtClaims>,
    link_id: web::Path<Uuid>,
    pool: web::Data<Arc<PgPool>>,
) -> Res<impl Responder> {
    services::page::delete_page(&pool, claims.user_id, link_id.into_inner()).await?;
    Success::no_content()
}
