use std::sync::Arc;

use actix_web::{HttpResponse, Responder, post, web};
use common::{
    error::{AppError, Res},
    http::Success,
    jwt::JwtClaims,
};
use serde_json::json;
use sqlx::PgPool;

use crate::{
    dtos::{
        pay::{CheckoutRequest, CheckoutResponse, CheckoutSessionRequest, PortalResponse},
        webhook::WebhookAck,
    },
    services::{self, reconcile::ACTIVE_STATUS, store::SubscriptionStore},
    state::BillingState,
};

/// Receives Stripe webhook events and feeds subscription events to the reconciler.
///
/// # Input
/// - `payload`: Raw request body, verified byte for byte against the signature
/// - `req`: HTTP request carrying the `Stripe-Signature` header
///
/// # Output
/// - 200 `{"received": true}` once the event is handled, skipped or ignored
/// - 400 when the signature header is missing or does not verify
/// - 500 `{"error": "Webhook handler failed"}` when reconciliation fails, so Stripe retries
///
/// # Stripe Configuration
/// 1. Stripe Dashboard → Developers → Webhooks → Add endpoint `https://<host>/api/stripe/webhook`
/// 2. Subscribe to `customer.subscription.created`, `customer.subscription.updated`,
///    `customer.subscription.deleted` and `checkout.session.completed`
/// 3. Put the signing secret in `STRIPE_WEBHOOK_SECRET`
#[post("/webhook")]
pub async fn post_webhook(
    payload: String,
    req: actix_web::HttpRequest,
    pool: web::Data<Arc<PgPool>>,
    billing: web::Data<Arc<BillingState>>,
) -> Res<HttpResponse> {
    let signature = req
        .headers()
        .get("stripe-signature")
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::BadRequest("No signature".to_string()))?;

    let event = services::webhook::construct_event(&payload, signature, billing.webhook_secret())?;
    log::info!("[webhook] received {} ({}, created {})", event.type_, event.id, event.created);

    let store: &PgPool = &pool;
    match services::webhook::process_event(store, billing.provider(), billing.prices(), &event).await {
        Ok(outcome) => {
            log::debug!("[webhook] event {} outcome: {:?}", event.id, outcome);
            Ok(HttpResponse::Ok().json(WebhookAck { received: true }))
        }
        Err(e) => {
            log::error!("[webhook] handler failed for {} ({}): {}", event.id, event.type_, e);
            Ok(HttpResponse::InternalServerError().json(json!({ "error": "Webhook handler failed" })))
        }
    }
}

/// Starts a subscription purchase, or sends an already subscribed user to the
/// Customer Portal to change plans.
///
/// # Input
/// - `claims`: JWT claims of the signed-in user
/// - `req`: `{ "price_id": "price_...", "plan_name": "core" }`
///
/// # Output
/// - `{ "url": "https://checkout.stripe.com/..." }` for a new subscription
/// - `{ "url": "https://billing.stripe.com/...", "is_upgrade": true, "message": "..." }` when active
///
/// # Frontend Example
/// ```javascript
/// const response = await fetch('/api/dashboard/billing/checkout', {
///   method: 'POST',
///   headers: {
///     'Content-Type': 'application/json',
///     'Authorization': `Bearer ${token}`
///   },
///   body: JSON.stringify({ price_id: 'price_123', plan_name: 'core' })
/// });
/// const { url } = await response.json();
/// window.location.href = url;
/// ```
#[post("/checkout")]
pub async fn post_checkout(
    claims: web::ReqData<JwtClaims>,
    req: web::Json<CheckoutRequest>,
    pool: web::Data<Arc<PgPool>>,
    billing: web::Data<Arc<BillingState>>,
) -> Res<impl Responder> {
    let price_id = req.price_id.trim();
    if price_id.is_empty() || req.plan_name.trim().is_empty() {
        return Err(AppError::BadRequest("Price ID and plan name are required".to_string()));
    }
    if !billing.prices().is_known(price_id) {
        return Err(AppError::BadRequest(format!("Unknown price: {}", price_id)));
    }

    let store: &PgPool = &pool;
    let existing = store.find_by_user(claims.user_id).await?;

    if let Some(record) = existing.filter(|r| r.status == ACTIVE_STATUS) {
        let return_url = format!("{}/dashboard", billing.app_url());
        let portal = services::pay::create_portal_session(
            billing.client(),
            &record.stripe_customer_id,
            &return_url,
        )
        .await?;

        return Success::ok(CheckoutResponse {
            url: portal.url,
            is_upgrade: true,
            message: Some("Redirecting to billing portal to change your plan".to_string()),
        });
    }

    let session = services::pay::create_subscription_session(
        billing.client(),
        CheckoutSessionRequest {
            user_id: claims.user_id,
            email: &claims.email,
            price_id,
            plan_name: req.plan_name.trim(),
            success_url: format!("{}/dashboard?success=true", billing.app_url()),
            cancel_url: format!("{}/pricing?canceled=true", billing.app_url()),
        },
    )
    .await?;

    let url = session
        .url
        .ok_or_else(|| AppError::Internal("Checkout session has no URL".to_string()))?;

    Success::ok(CheckoutResponse {
        url,
        is_upgrade: false,
        message: None,
    })
}

/// Opens the Stripe Customer Portal for the signed-in user.
///
/// # Output
/// - `{ "url": "https://billing.stripe.com/..." }`
/// - 404 when the user never subscribed
#[post("/portal")]
pub async fn post_portal(
    claims: web::ReqData<JwtClaims>,
    pool: web::Data<Arc<PgPool>>,
    billing: web::Data<Arc<BillingState>>,
) -> Res<impl Responder> {
    let store: &PgPool = &pool;
    let record = store
        .find_by_user(claims.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("No subscription found".to_string()))?;

    let return_url = format!("{}/dashboard", billing.app_url());
    let portal =
        services::pay::create_portal_session(billing.client(), &record.stripe_customer_id, &return_url)
            .await?;

    Success::ok(PortalResponse { url: portal.url })
}
