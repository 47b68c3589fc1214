use chrono::{DateTime, Utc};

/// Full overwrite applied when a subscription is created, keyed by user id.
#[derive(Debug, Clone, PartialEq)]
pub struct SubscriptionUpsert {
    pub stripe_customer_id: String,
    pub stripe_subscription_id: String,
    pub stripe_price_id: String,
    pub plan: String,
    pub status: String,
    pub current_period_end: DateTime<Utc>,
    pub cancel_at: Option<DateTime<Utc>>,
}

/// Overwrite applied on update and sign-in sync, keyed by Stripe subscription id.
#[derive(Debug, Clone, PartialEq)]
pub struct SubscriptionUpdate {
    pub stripe_price_id: String,
    pub plan: String,
    pub status: String,
    pub current_period_end: DateTime<Utc>,
    pub cancel_at: Option<DateTime<Utc>>,
}
