use chrono::Utc;
use common::error::{AppError, Res};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::{
    dtos::{provider::ProviderSubscription, webhook::WebhookEvent},
    misc::price::PriceResolver,
    services::{
        provider::BillingProvider,
        reconcile::{self, WebhookOutcome},
        store::SubscriptionStore,
    },
};

type HmacSha256 = Hmac<Sha256>;

/// Maximum age of a signed payload, in seconds.
pub const SIGNATURE_TOLERANCE_SECS: i64 = 300;

pub const SUBSCRIPTION_CREATED: &str = "customer.subscription.created";
pub const SUBSCRIPTION_UPDATED: &str = "customer.subscription.updated";
pub const SUBSCRIPTION_DELETED: &str = "customer.subscription.deleted";
pub const CHECKOUT_SESSION_COMPLETED: &str = "checkout.session.completed";

fn invalid_signature() -> AppError {
    AppError::BadRequest("Invalid signature".to_string())
}

/// Verifies a `Stripe-Signature` header (`t=<unix>,v1=<hex>[,v1=...]`).
///
/// The expected signature is HMAC-SHA256 of `"{t}.{payload}"` keyed with the
/// endpoint secret. Any matching `v1` entry is accepted, comparisons are
/// constant time and timestamps older than the tolerance are refused.
pub fn verify_signature(payload: &str, header: &str, secret: &str, now: i64) -> Res<()> {
    if secret.is_empty() {
        log::error!("[webhook] STRIPE_WEBHOOK_SECRET is not configured, refusing event");
        return Err(invalid_signature());
    }

    let mut timestamp = None;
    let mut signatures = Vec::new();
    for part in header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", value)) => timestamp = value.parse::<i64>().ok(),
            Some(("v1", value)) => signatures.push(value),
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or_else(invalid_signature)?;
    if signatures.is_empty() {
        return Err(invalid_signature());
    }
    if now.abs_diff(timestamp) > SIGNATURE_TOLERANCE_SECS.unsigned_abs() {
        log::warn!("[webhook] signature timestamp {} outside tolerance", timestamp);
        return Err(invalid_signature());
    }

    let signed_payload = format!("{}.{}", timestamp, payload);
    let matched = signatures.iter().any(|signature| {
        let Ok(expected) = hex::decode(signature) else {
            return false;
        };
        let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
            return false;
        };
        mac.update(signed_payload.as_bytes());
        mac.verify_slice(&expected).is_ok()
    });

    if matched { Ok(()) } else { Err(invalid_signature()) }
}

/// Verifies the signature, then parses the envelope.
pub fn construct_event(payload: &str, signature: &str, secret: &str) -> Res<WebhookEvent> {
    verify_signature(payload, signature, secret, Utc::now().timestamp()).inspect_err(|e| {
        log::error!("[webhook] signature verification failed: {}", e);
    })?;

    serde_json::from_str::<WebhookEvent>(payload)
        .map_err(|e| AppError::BadRequest(format!("Webhook Error: {}", e)))
}

fn subscription_object(event: &WebhookEvent) -> Res<ProviderSubscription> {
    serde_json::from_value(event.data.object.clone()).map_err(|e| {
        AppError::Internal(format!(
            "event {} carries an unreadable subscription: {}",
            event.id, e
        ))
    })
}

/// Routes a verified event to the reconciler.
pub async fn process_event<S, P>(
    store: &S,
    provider: &P,
    prices: &PriceResolver,
    event: &WebhookEvent,
) -> Res<WebhookOutcome>
where
    S: SubscriptionStore + ?Sized,
    P: BillingProvider + ?Sized,
{
    match event.type_.as_str() {
        SUBSCRIPTION_CREATED => {
            let sub = subscription_object(event)?;
            reconcile::handle_subscription_created(store, provider, prices, &sub).await
        }
        SUBSCRIPTION_UPDATED => {
            let sub = subscription_object(event)?;
            reconcile::handle_subscription_updated(store, prices, &sub).await
        }
        SUBSCRIPTION_DELETED => {
            let sub = subscription_object(event)?;
            reconcile::handle_subscription_deleted(store, &sub).await
        }
        CHECKOUT_SESSION_COMPLETED => {
            log::info!("[webhook] checkout session completed: {}", event.id);
            Ok(WebhookOutcome::Ignored)
        }
        other => {
            log::info!("[webhook] unhandled event type: {}", other);
            Ok(WebhookOutcome::Ignored)
        }
    }
}

/// Builds a header value the way Stripe does. Used by tests and local tooling.
pub fn sign_payload(payload: &str, secret: &str, timestamp: i64) -> Res<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| AppError::Internal(format!("invalid webhook secret: {}", e)))?;
    mac.update(format!("{}.{}", timestamp, payload).as_bytes());
    Ok(format!(
        "t={},v1={}",
        timestamp,
        hex::encode(mac.finalize().into_bytes())
    ))
}
