use async_trait::async_trait;
use common::error::{AppError, Res};
use serde::Serialize;
use stripe::Client;

use crate::dtos::provider::{CheckoutSessionSummary, ProviderList, ProviderSubscription};

/// Number of recent checkout sessions searched when recovering metadata.
pub const CHECKOUT_SESSION_LOOKUP_LIMIT: u64 = 10;

/// Read-only billing provider calls the reconciler depends on.
#[async_trait]
pub trait BillingProvider: Send + Sync {
    async fn retrieve_subscription(&self, subscription_id: &str) -> Res<ProviderSubscription>;

    async fn list_checkout_sessions(
        &self,
        customer_id: &str,
        limit: u64,
    ) -> Res<Vec<CheckoutSessionSummary>>;
}

/// Stripe-backed provider. Responses are decoded into the lenient
/// `dtos::provider` types instead of the generated SDK structs.
#[derive(Clone)]
pub struct StripeBilling {
    client: Client,
}

#[derive(Serialize)]
struct ListCheckoutSessions<'a> {
    customer: &'a str,
    limit: u64,
}

impl StripeBilling {
    pub fn new(client: Client) -> Self {
        StripeBilling { client }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }
}

#[async_trait]
impl BillingProvider for StripeBilling {
    async fn retrieve_subscription(&self, subscription_id: &str) -> Res<ProviderSubscription> {
        self.client
            .get::<ProviderSubscription>(&format!("/subscriptions/{}", subscription_id))
            .await
            .map_err(AppError::from)
    }

    async fn list_checkout_sessions(
        &self,
        customer_id: &str,
        limit: u64,
    ) -> Res<Vec<CheckoutSessionSummary>> {
        let list = self
            .client
            .get_query::<ProviderList<CheckoutSessionSummary>, _>(
                "/checkout/sessions",
                ListCheckoutSessions {
                    customer: customer_id,
                    limit,
                },
            )
            .await
            .map_err(AppError::from)?;
        Ok(list.data)
    }
}
