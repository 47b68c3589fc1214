//! Keeps the local subscription record in step with Stripe.
//!
//! Two paths write the same row: webhook deliveries (`handle_subscription_*`)
//! and the pull on sign-in (`sync_subscription_from_provider`). Both overwrite
//! whole fields, so replays and out-of-order deliveries converge.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use common::error::{AppError, Res};
use db::{
    dtos::subscription::{SubscriptionUpdate, SubscriptionUpsert},
    models::subscription::SubscriptionRecord,
};
use uuid::Uuid;

use crate::{
    dtos::provider::ProviderSubscription,
    misc::price::PriceResolver,
    models::plan::PlanTier,
    services::{
        period::{DIRECT_ONLY, FULL_CHAIN, resolve_period_end},
        provider::{BillingProvider, CHECKOUT_SESSION_LOOKUP_LIMIT},
        store::SubscriptionStore,
    },
};

pub const ACTIVE_STATUS: &str = "active";
pub const CANCELED_STATUS: &str = "canceled";
pub const GRACE_PERIOD_HOURS: i64 = 24;

const USER_ID_KEY: &str = "userId";
const PLAN_NAME_KEY: &str = "planName";

/// What a webhook delivery did to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookOutcome {
    Applied,
    /// Acknowledged without touching the store.
    Skipped(&'static str),
    /// Event kind the reconciler does not act on.
    Ignored,
}

/// Plan the user is entitled to right now. Pure: no I/O, no clock.
pub fn effective_plan(record: Option<&SubscriptionRecord>, now: DateTime<Utc>) -> PlanTier {
    let Some(record) = record else {
        return PlanTier::Free;
    };
    if record.status != ACTIVE_STATUS {
        return PlanTier::Free;
    }
    if now > record.current_period_end + Duration::hours(GRACE_PERIOD_HOURS) {
        return PlanTier::Free;
    }
    record.plan.parse().unwrap_or_else(|e| {
        log::warn!("Stored plan for user {} is unreadable: {}", record.user_id, e);
        PlanTier::Free
    })
}

/// Explicit `cancel_at` wins, otherwise a pending end-of-period cancel uses the period end.
fn cancel_at(sub: &ProviderSubscription, period_end: DateTime<Utc>) -> Option<DateTime<Utc>> {
    match sub.cancel_at.and_then(super::period::timestamp) {
        Some(at) => Some(at),
        None if sub.cancel_at_period_end => Some(period_end),
        None => None,
    }
}

/// Metadata attached at checkout. Falls back to the customer's recent checkout
/// sessions because Stripe does not always copy it onto the subscription.
async fn resolve_checkout_metadata<P>(
    provider: &P,
    sub: &ProviderSubscription,
) -> Option<HashMap<String, String>>
where
    P: BillingProvider + ?Sized,
{
    if sub.metadata_value(USER_ID_KEY).is_some() {
        return sub.metadata.clone();
    }

    let customer_id = sub.customer_id()?;
    log::info!(
        "[webhook] subscription {} has no userId metadata, searching checkout sessions of {}",
        sub.id,
        customer_id
    );

    let sessions = match provider
        .list_checkout_sessions(customer_id, CHECKOUT_SESSION_LOOKUP_LIMIT)
        .await
    {
        Ok(sessions) => sessions,
        Err(e) => {
            log::error!("[webhook] checkout session lookup for {} failed: {}", sub.id, e);
            return None;
        }
    };

    sessions
        .into_iter()
        .find(|session| {
            session
                .subscription
                .as_ref()
                .is_some_and(|s| s.id() == sub.id)
        })
        .and_then(|session| session.metadata)
}

/// `customer.subscription.created`: upsert keyed by the user id found in metadata.
pub async fn handle_subscription_created<S, P>(
    store: &S,
    provider: &P,
    prices: &PriceResolver,
    sub: &ProviderSubscription,
) -> Res<WebhookOutcome>
where
    S: SubscriptionStore + ?Sized,
    P: BillingProvider + ?Sized,
{
    log::info!("[webhook] subscription created: {} ({})", sub.id, sub.status);

    let Some(metadata) = resolve_checkout_metadata(provider, sub).await else {
        log::warn!("[webhook] skipped subscription {}: no checkout metadata found", sub.id);
        return Ok(WebhookOutcome::Skipped("no checkout metadata"));
    };

    let user_id = metadata
        .get(USER_ID_KEY)
        .and_then(|raw| Uuid::parse_str(raw).ok());
    let plan_name = metadata.get(PLAN_NAME_KEY).filter(|p| !p.is_empty());
    let (Some(user_id), Some(plan_name)) = (user_id, plan_name) else {
        log::warn!(
            "[webhook] skipped subscription {}: metadata lacks a valid userId or planName",
            sub.id
        );
        return Ok(WebhookOutcome::Skipped("incomplete checkout metadata"));
    };

    let current_period_end = resolve_period_end(sub, FULL_CHAIN).ok_or_else(|| {
        AppError::Internal(format!("current_period_end not found for subscription {}", sub.id))
    })?;
    let price_id = sub
        .price_id()
        .ok_or_else(|| AppError::Internal(format!("Price ID not found for subscription {}", sub.id)))?;
    let customer_id = sub.customer_id().ok_or_else(|| {
        AppError::Internal(format!("Customer ID not found for subscription {}", sub.id))
    })?;

    let plan = prices.resolve(price_id);
    if plan.as_str() != plan_name.to_ascii_lowercase() {
        log::info!(
            "[webhook] checkout planName {} differs from price plan {} for {}",
            plan_name,
            plan,
            sub.id
        );
    }

    let data = SubscriptionUpsert {
        stripe_customer_id: customer_id.to_string(),
        stripe_subscription_id: sub.id.clone(),
        stripe_price_id: price_id.to_string(),
        plan: plan.as_str().to_string(),
        status: sub.status.clone(),
        current_period_end,
        cancel_at: cancel_at(sub, current_period_end),
    };
    store.upsert_by_user(user_id, &data).await?;

    log::info!(
        "[webhook] subscription {} stored for user {} on plan {}",
        sub.id,
        user_id,
        plan
    );
    Ok(WebhookOutcome::Applied)
}

/// `customer.subscription.updated`: overwrite keyed by the Stripe subscription id.
pub async fn handle_subscription_updated<S>(
    store: &S,
    prices: &PriceResolver,
    sub: &ProviderSubscription,
) -> Res<WebhookOutcome>
where
    S: SubscriptionStore + ?Sized,
{
    log::info!("[webhook] subscription updated: {} ({})", sub.id, sub.status);

    let Some(current_period_end) = resolve_period_end(sub, DIRECT_ONLY) else {
        log::warn!(
            "[webhook] skipped update of {}: current_period_end not present",
            sub.id
        );
        return Ok(WebhookOutcome::Skipped("missing current_period_end"));
    };
    let price_id = sub
        .price_id()
        .ok_or_else(|| AppError::Internal(format!("Price ID not found for subscription {}", sub.id)))?;

    let plan = prices.resolve(price_id);
    let data = SubscriptionUpdate {
        stripe_price_id: price_id.to_string(),
        plan: plan.as_str().to_string(),
        status: sub.status.clone(),
        current_period_end,
        cancel_at: cancel_at(sub, current_period_end),
    };

    match store.update_by_subscription_id(&sub.id, &data).await? {
        Some(record) => {
            log::info!(
                "[webhook] subscription {} updated for user {}: {} / {}",
                sub.id,
                record.user_id,
                plan,
                record.status
            );
            Ok(WebhookOutcome::Applied)
        }
        None => Err(AppError::NotFound(format!(
            "no subscription record for {}",
            sub.id
        ))),
    }
}

/// `customer.subscription.deleted`: only the status changes, the row is kept.
pub async fn handle_subscription_deleted<S>(
    store: &S,
    sub: &ProviderSubscription,
) -> Res<WebhookOutcome>
where
    S: SubscriptionStore + ?Sized,
{
    log::info!("[webhook] subscription deleted: {}", sub.id);

    match store.mark_canceled(&sub.id).await? {
        Some(record) => {
            log::info!(
                "[webhook] subscription {} canceled for user {}",
                sub.id,
                record.user_id
            );
            Ok(WebhookOutcome::Applied)
        }
        None => Err(AppError::NotFound(format!(
            "no subscription record for {}",
            sub.id
        ))),
    }
}

/// Pull path run after sign-in. Never fails: every error is logged and
/// swallowed. Returns whether the record was refreshed.
pub async fn sync_subscription_from_provider<S, P>(
    store: &S,
    provider: &P,
    prices: &PriceResolver,
    user_id: Uuid,
) -> bool
where
    S: SubscriptionStore + ?Sized,
    P: BillingProvider + ?Sized,
{
    match try_sync(store, provider, prices, user_id).await {
        Ok(synced) => synced,
        Err(e) => {
            log::warn!("[sync] subscription sync for user {} failed: {}", user_id, e);
            false
        }
    }
}

async fn try_sync<S, P>(store: &S, provider: &P, prices: &PriceResolver, user_id: Uuid) -> Res<bool>
where
    S: SubscriptionStore + ?Sized,
    P: BillingProvider + ?Sized,
{
    let Some(record) = store.find_by_user(user_id).await? else {
        return Ok(false);
    };
    if record.stripe_subscription_id.is_empty() {
        return Ok(false);
    }

    let sub = provider
        .retrieve_subscription(&record.stripe_subscription_id)
        .await?;

    let Some(current_period_end) = resolve_period_end(&sub, FULL_CHAIN) else {
        log::warn!(
            "[sync] subscription {} has no resolvable period end, keeping stored record",
            sub.id
        );
        return Ok(false);
    };
    let price_id = sub.price_id().unwrap_or(record.stripe_price_id.as_str());
    let plan = prices.resolve(price_id);

    let data = SubscriptionUpdate {
        stripe_price_id: price_id.to_string(),
        plan: plan.as_str().to_string(),
        status: sub.status.clone(),
        current_period_end,
        cancel_at: cancel_at(&sub, current_period_end),
    };
    let updated = store
        .update_by_subscription_id(&record.stripe_subscription_id, &data)
        .await?;

    log::info!(
        "[sync] subscription {} for user {} refreshed: {} / {}",
        record.stripe_subscription_id,
        user_id,
        plan,
        sub.status
    );
    Ok(updated.is_some())
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use common::env_config::StripePrices;
    use serde_json::json;

    use super::*;
    use crate::{
        dtos::provider::CheckoutSessionSummary,
        services::{provider::fake::FakeProvider, store::memory::MemoryStore},
    };

    const PERIOD_END: i64 = 1_735_689_600; // 2025-01-01T00:00:00Z

    fn prices() -> PriceResolver {
        PriceResolver::from_config(&StripePrices {
            core_monthly: "price_core".to_string(),
            pro_monthly: "price_pro".to_string(),
            ..Default::default()
        })
    }

    fn subscription(value: serde_json::Value) -> ProviderSubscription {
        serde_json::from_value(value).unwrap()
    }

    fn created_event(user_id: Uuid) -> ProviderSubscription {
        subscription(json!({
            "id": "sub_1",
            "customer": "cus_1",
            "status": "active",
            "metadata": { "userId": user_id.to_string(), "planName": "core" },
            "items": { "data": [ { "current_period_end": PERIOD_END, "price": { "id": "price_core" } } ] }
        }))
    }

    fn record(user_id: Uuid, status: &str, plan: &str, period_end: DateTime<Utc>) -> SubscriptionRecord {
        SubscriptionRecord {
            id: Uuid::new_v4(),
            user_id,
            stripe_customer_id: "cus_1".to_string(),
            stripe_subscription_id: "sub_1".to_string(),
            stripe_price_id: "price_core".to_string(),
            plan: plan.to_string(),
            status: status.to_string(),
            current_period_end: period_end,
            cancel_at: None,
            created_at: period_end,
            updated_at: period_end,
        }
    }

    fn period_end() -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(PERIOD_END, 0).unwrap()
    }

    #[test]
    fn effective_plan_without_record_is_free() {
        assert_eq!(effective_plan(None, Utc::now()), PlanTier::Free);
    }

    #[test]
    fn effective_plan_honours_the_grace_window() {
        let end = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let active = record(Uuid::new_v4(), "active", "core", end);

        let inside = end + Duration::hours(23) + Duration::minutes(59);
        let outside = end + Duration::hours(24) + Duration::minutes(1);

        assert_eq!(effective_plan(Some(&active), inside), PlanTier::Core);
        assert_eq!(effective_plan(Some(&active), outside), PlanTier::Free);
    }

    #[test]
    fn effective_plan_requires_active_status() {
        let end = period_end();
        for status in ["canceled", "past_due", "trialing", "incomplete"] {
            let row = record(Uuid::new_v4(), status, "pro", end);
            assert_eq!(effective_plan(Some(&row), end), PlanTier::Free, "{status}");
        }
    }

    #[test]
    fn effective_plan_is_deterministic_for_the_same_inputs() {
        let row = record(Uuid::new_v4(), "active", "pro", period_end());
        let now = period_end() - Duration::days(3);
        assert_eq!(effective_plan(Some(&row), now), effective_plan(Some(&row), now));
        assert_eq!(effective_plan(Some(&row), now), PlanTier::Pro);
    }

    #[tokio::test]
    async fn created_event_applied_twice_yields_one_identical_row() {
        let store = MemoryStore::default();
        let provider = FakeProvider::default();
        let user_id = Uuid::new_v4();
        let event = created_event(user_id);

        let first = handle_subscription_created(&store, &provider, &prices(), &event)
            .await
            .unwrap();
        let after_first = store.get(user_id).unwrap();
        let second = handle_subscription_created(&store, &provider, &prices(), &event)
            .await
            .unwrap();

        assert_eq!(first, WebhookOutcome::Applied);
        assert_eq!(second, WebhookOutcome::Applied);
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(user_id).unwrap(), after_first);
        assert_eq!(after_first.plan, "core");
        assert_eq!(after_first.current_period_end, period_end());
        assert_eq!(provider.lookups(), 0);
    }

    #[tokio::test]
    async fn created_event_plan_comes_from_price_not_metadata() {
        let store = MemoryStore::default();
        let user_id = Uuid::new_v4();
        let event = subscription(json!({
            "id": "sub_1",
            "customer": "cus_1",
            "status": "active",
            "metadata": { "userId": user_id.to_string(), "planName": "pro" },
            "items": { "data": [ { "current_period_end": PERIOD_END, "price": { "id": "price_unknown" } } ] }
        }));

        handle_subscription_created(&store, &FakeProvider::default(), &prices(), &event)
            .await
            .unwrap();

        assert_eq!(store.get(user_id).unwrap().plan, "free");
    }

    #[tokio::test]
    async fn created_event_recovers_metadata_from_checkout_session() {
        let store = MemoryStore::default();
        let user_id = Uuid::new_v4();
        let provider = FakeProvider {
            sessions: vec![
                CheckoutSessionSummary {
                    id: "cs_other".to_string(),
                    subscription: Some(crate::dtos::provider::Expandable::Id("sub_other".to_string())),
                    metadata: None,
                },
                CheckoutSessionSummary {
                    id: "cs_1".to_string(),
                    subscription: Some(crate::dtos::provider::Expandable::Id("sub_1".to_string())),
                    metadata: Some(HashMap::from([
                        ("userId".to_string(), user_id.to_string()),
                        ("planName".to_string(), "core".to_string()),
                    ])),
                },
            ],
            ..Default::default()
        };
        let event = subscription(json!({
            "id": "sub_1",
            "customer": "cus_1",
            "status": "active",
            "metadata": {},
            "items": { "data": [ { "current_period_end": PERIOD_END, "price": { "id": "price_core" } } ] }
        }));

        let outcome = handle_subscription_created(&store, &provider, &prices(), &event)
            .await
            .unwrap();

        assert_eq!(outcome, WebhookOutcome::Applied);
        assert_eq!(provider.lookups(), 1);
        assert_eq!(store.get(user_id).unwrap().stripe_subscription_id, "sub_1");
    }

    #[tokio::test]
    async fn created_event_without_resolvable_user_is_a_soft_no_op() {
        let store = MemoryStore::default();
        let provider = FakeProvider::default();
        let event = subscription(json!({
            "id": "sub_1",
            "customer": "cus_1",
            "status": "active",
            "items": { "data": [ { "current_period_end": PERIOD_END, "price": { "id": "price_core" } } ] }
        }));

        let outcome = handle_subscription_created(&store, &provider, &prices(), &event)
            .await
            .unwrap();

        assert!(matches!(outcome, WebhookOutcome::Skipped(_)));
        assert_eq!(store.len(), 0);
    }

    #[tokio::test]
    async fn created_event_survives_a_failed_session_lookup() {
        let store = MemoryStore::default();
        let provider = FakeProvider {
            offline: true,
            ..Default::default()
        };
        let event = subscription(json!({ "id": "sub_1", "customer": "cus_1", "status": "active" }));

        let outcome = handle_subscription_created(&store, &provider, &prices(), &event)
            .await
            .unwrap();

        assert!(matches!(outcome, WebhookOutcome::Skipped(_)));
        assert_eq!(store.len(), 0);
    }

    #[tokio::test]
    async fn created_event_without_period_end_is_fatal() {
        let store = MemoryStore::default();
        let user_id = Uuid::new_v4();
        let event = subscription(json!({
            "id": "sub_1",
            "customer": "cus_1",
            "status": "active",
            "metadata": { "userId": user_id.to_string(), "planName": "core" },
            "items": { "data": [ { "price": { "id": "price_core" } } ] }
        }));

        let result = handle_subscription_created(&store, &FakeProvider::default(), &prices(), &event).await;

        assert!(result.is_err());
        assert_eq!(store.len(), 0);
    }

    #[tokio::test]
    async fn created_event_uses_period_end_as_cancel_at_when_cancelling_at_period_end() {
        let store = MemoryStore::default();
        let user_id = Uuid::new_v4();
        let event = subscription(json!({
            "id": "sub_1",
            "customer": "cus_1",
            "status": "active",
            "cancel_at_period_end": true,
            "metadata": { "userId": user_id.to_string(), "planName": "core" },
            "items": { "data": [ { "current_period_end": PERIOD_END, "price": { "id": "price_core" } } ] }
        }));

        handle_subscription_created(&store, &FakeProvider::default(), &prices(), &event)
            .await
            .unwrap();

        assert_eq!(store.get(user_id).unwrap().cancel_at, Some(period_end()));
    }

    #[tokio::test]
    async fn updated_event_falls_back_to_legacy_period_end() {
        let user_id = Uuid::new_v4();
        let store = MemoryStore::with_record(record(user_id, "active", "core", period_end()));
        let legacy_end = PERIOD_END + 2_678_400;
        let event = subscription(json!({
            "id": "sub_1",
            "status": "active",
            "current_period_end": legacy_end,
            "items": { "data": [ { "price": { "id": "price_pro" } } ] }
        }));

        let outcome = handle_subscription_updated(&store, &prices(), &event).await.unwrap();

        let row = store.get(user_id).unwrap();
        assert_eq!(outcome, WebhookOutcome::Applied);
        assert_eq!(row.current_period_end, DateTime::<Utc>::from_timestamp(legacy_end, 0).unwrap());
        assert_eq!(row.plan, "pro");
        assert_eq!(row.stripe_price_id, "price_pro");
    }

    #[tokio::test]
    async fn updated_event_without_period_end_leaves_row_untouched() {
        let user_id = Uuid::new_v4();
        let before = record(user_id, "active", "core", period_end());
        let store = MemoryStore::with_record(before.clone());
        let event = subscription(json!({
            "id": "sub_1",
            "status": "past_due",
            "billing_cycle_anchor": PERIOD_END,
            "items": { "data": [ { "price": { "id": "price_pro", "recurring": { "interval": "month" } } } ] }
        }));

        let outcome = handle_subscription_updated(&store, &prices(), &event).await.unwrap();

        assert!(matches!(outcome, WebhookOutcome::Skipped(_)));
        assert_eq!(store.get(user_id).unwrap(), before);
    }

    #[tokio::test]
    async fn updated_event_for_unknown_subscription_is_fatal() {
        let store = MemoryStore::default();
        let event = subscription(json!({
            "id": "sub_missing",
            "status": "active",
            "items": { "data": [ { "current_period_end": PERIOD_END, "price": { "id": "price_core" } } ] }
        }));

        assert!(handle_subscription_updated(&store, &prices(), &event).await.is_err());
    }

    #[tokio::test]
    async fn deleted_event_only_changes_status() {
        let user_id = Uuid::new_v4();
        let before = record(user_id, "active", "pro", period_end());
        let store = MemoryStore::with_record(before.clone());
        let event = subscription(json!({ "id": "sub_1", "status": "canceled" }));

        let outcome = handle_subscription_deleted(&store, &event).await.unwrap();

        let after = store.get(user_id).unwrap();
        assert_eq!(outcome, WebhookOutcome::Applied);
        assert_eq!(after.status, CANCELED_STATUS);
        assert_eq!(
            SubscriptionRecord {
                status: before.status.clone(),
                ..after
            },
            before
        );
    }

    #[tokio::test]
    async fn deleted_event_for_unknown_subscription_is_fatal() {
        let store = MemoryStore::default();
        let event = subscription(json!({ "id": "sub_missing" }));
        assert!(handle_subscription_deleted(&store, &event).await.is_err());
    }

    #[tokio::test]
    async fn sign_in_sync_overwrites_from_provider() {
        let user_id = Uuid::new_v4();
        let store = MemoryStore::with_record(record(user_id, "past_due", "core", period_end()));
        let new_end = PERIOD_END + 86_400 * 30;
        let provider = FakeProvider {
            subscriptions: HashMap::from([(
                "sub_1".to_string(),
                subscription(json!({
                    "id": "sub_1",
                    "status": "active",
                    "items": { "data": [ { "current_period_end": new_end, "price": { "id": "price_pro" } } ] }
                })),
            )]),
            ..Default::default()
        };

        assert!(sync_subscription_from_provider(&store, &provider, &prices(), user_id).await);

        let row = store.get(user_id).unwrap();
        assert_eq!(row.status, "active");
        assert_eq!(row.plan, "pro");
        assert_eq!(row.current_period_end, DateTime::<Utc>::from_timestamp(new_end, 0).unwrap());
    }

    #[tokio::test]
    async fn sign_in_sync_swallows_provider_failures() {
        let user_id = Uuid::new_v4();
        let before = record(user_id, "active", "core", period_end());
        let store = MemoryStore::with_record(before.clone());
        let provider = FakeProvider {
            offline: true,
            ..Default::default()
        };

        assert!(!sync_subscription_from_provider(&store, &provider, &prices(), user_id).await);
        assert_eq!(store.get(user_id).unwrap(), before);
    }

    #[tokio::test]
    async fn sign_in_sync_without_record_does_nothing() {
        let store = MemoryStore::default();
        let provider = FakeProvider::default();
        assert!(!sync_subscription_from_provider(&store, &provider, &prices(), Uuid::new_v4()).await);
        assert_eq!(store.len(), 0);
    }
}
