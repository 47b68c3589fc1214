//! Lenient views of Stripe objects. Only the fields the reconciler reads are
//! declared and every one of them may be absent, so API-version drift (for
//! example `current_period_end` moving onto subscription items) never fails
//! deserialization.

use std::collections::HashMap;

use serde::Deserialize;

/// A reference Stripe may return either as a bare id or as an expanded object.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Expandable {
    Id(String),
    Object { id: String },
}

impl Expandable {
    pub fn id(&self) -> &str {
        match self {
            Expandable::Id(id) => id,
            Expandable::Object { id } => id,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderList<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
}

impl<T> Default for ProviderList<T> {
    fn default() -> Self {
        ProviderList { data: Vec::new() }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Recurring {
    pub interval: String,
    #[serde(default)]
    pub interval_count: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderPrice {
    pub id: String,
    #[serde(default)]
    pub recurring: Option<Recurring>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubscriptionItem {
    #[serde(default)]
    pub current_period_end: Option<i64>,
    #[serde(default)]
    pub price: Option<ProviderPrice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderSubscription {
    pub id: String,
    #[serde(default)]
    pub customer: Option<Expandable>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub metadata: Option<HashMap<String, String>>,
    #[serde(default)]
    pub items: ProviderList<SubscriptionItem>,
    /// Top-level period end, dropped from newer API versions.
    #[serde(default)]
    pub current_period_end: Option<i64>,
    #[serde(default)]
    pub billing_cycle_anchor: Option<i64>,
    #[serde(default)]
    pub cancel_at: Option<i64>,
    #[serde(default)]
    pub cancel_at_period_end: bool,
}

impl ProviderSubscription {
    pub fn first_item(&self) -> Option<&SubscriptionItem> {
        self.items.data.first()
    }

    pub fn price_id(&self) -> Option<&str> {
        self.first_item()?
            .price
            .as_ref()
            .map(|price| price.id.as_str())
            .filter(|id| !id.is_empty())
    }

    pub fn customer_id(&self) -> Option<&str> {
        self.customer
            .as_ref()
            .map(Expandable::id)
            .filter(|id| !id.is_empty())
    }

    pub fn metadata_value(&self, key: &str) -> Option<&str> {
        self.metadata
            .as_ref()?
            .get(key)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutSessionSummary {
    pub id: String,
    #[serde(default)]
    pub subscription: Option<Expandable>,
    #[serde(default)]
    pub metadata: Option<HashMap<String, String>>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn subscription_without_period_fields_still_parses() {
        let sub: ProviderSubscription = serde_json::from_value(json!({
            "id": "sub_1",
            "object": "subscription",
            "customer": "cus_1",
            "status": "active",
            "metadata": {},
            "items": { "object": "list", "data": [ { "id": "si_1", "price": { "id": "price_1" } } ] }
        }))
        .unwrap();

        assert_eq!(sub.price_id(), Some("price_1"));
        assert_eq!(sub.customer_id(), Some("cus_1"));
        assert_eq!(sub.current_period_end, None);
        assert_eq!(sub.first_item().and_then(|i| i.current_period_end), None);
    }

    #[test]
    fn expanded_customer_yields_its_id() {
        let sub: ProviderSubscription = serde_json::from_value(json!({
            "id": "sub_1",
            "customer": { "id": "cus_9", "object": "customer", "email": "a@b.co" },
            "metadata": null
        }))
        .unwrap();

        assert_eq!(sub.customer_id(), Some("cus_9"));
        assert_eq!(sub.metadata_value("userId"), None);
        assert!(sub.items.data.is_empty());
    }
}
