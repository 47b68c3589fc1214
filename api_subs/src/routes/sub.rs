use std::sync::Arc;

use actix_web::{Responder, get, web};
use chrono::Utc;
use common::{error::Res, http::Success, jwt::JwtClaims};
use sqlx::PgPool;

use crate::{
    dtos::sub::{PlansResponse, SubscriptionOverview, Usage},
    models::plan::PlanCatalog,
    services::{reconcile, store::SubscriptionStore},
};

/// Lists every plan tier with its limits. `null` means unlimited.
///
/// # Frontend Example
/// ```javascript
/// const { plans } = await (await fetch('/api/plans')).json();
/// // [{ plan: "free", limits: { links: 3, email_signups: 10, landing_pages: 1, qr_codes: 0 } }, ...]
/// ```
#[get("/plans")]
pub async fn get_plans(catalog: web::Data<Arc<PlanCatalog>>) -> Res<impl Responder> {
    Success::ok(PlansResponse {
        plans: catalog.entries(),
    })
}

/// Returns the caller's stored subscription, the plan currently in effect,
/// its limits and how much of each limit is used.
#[get("/subscription")]
pub async fn get_subscription(
    claims: web::ReqData<JwtClaims>,
    pool: web::Data<Arc<PgPool>>,
    catalog: web::Data<Arc<PlanCatalog>>,
) -> Res<impl Responder> {
    let store: &PgPool = &pool;
    let record = store.find_by_user(claims.user_id).await?;
    let plan = reconcile::effective_plan(record.as_ref(), Utc::now());

    let usage = Usage {
        links: db::link::count_links_by_user(store, claims.user_id).await?,
        email_signups: db::signup::count_signups_by_owner(store, claims.user_id).await?,
        landing_pages: db::page::count_pages_by_owner(store, claims.user_id).await?,
    };

    Success::ok(SubscriptionOverview {
        subscription: record,
        plan,
        limits: *catalog.limits(plan),
        usage,
    })
}
