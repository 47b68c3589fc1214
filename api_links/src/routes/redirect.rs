use std::sync::Arc;

use actix_web::{Responder, get, web};
use common::{error::Res, http::Success};
use sqlx::PgPool;

use crate::services;

/// Resolves a short code for the interstitial screen and counts the click.
///
/// # Output
/// - `{ "kind": "page", "link_id", "original_url", "html", "css" }` when the owner built a page
/// - `{ "kind": "newsletter", "link_id", "original_url" }` otherwise
/// - 404 for unknown or deleted links, 410 for deactivated ones
///
/// # Frontend Example
/// ```javascript
/// const target = await (await fetch(`/api/r/${shortCode}`)).json();
/// if (target.kind === 'page') renderPage(target.html, target.css);
/// else renderNewsletter(target.link_id, target.original_url);
/// ```
#[get("/r/{short_code}")]
pub async fn get_redirect(
    short_code: web::Path<String>,
    pool: web::Data<Arc<PgPool>>,
) -> Res<impl Responder> {
    let target = services::redirect::resolve(&pool, &short_code).await?;
    Success::ok(target)
}
