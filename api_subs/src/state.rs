use common::env_config::Config;
use stripe::Client;

use crate::{misc::price::PriceResolver, services::provider::StripeBilling};

/// Billing collaborators built once at startup and shared through `web::Data`.
pub struct BillingState {
    provider: StripeBilling,
    prices: PriceResolver,
    webhook_secret: String,
    app_url: String,
}

impl BillingState {
    pub fn new(client: Client, prices: PriceResolver, webhook_secret: &str, app_url: &str) -> Self {
        BillingState {
            provider: StripeBilling::new(client),
            prices,
            webhook_secret: webhook_secret.to_string(),
            app_url: app_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        if config.stripe_secret_key.is_empty() {
            log::warn!("STRIPE_SECRET_KEY is not set, billing calls will fail");
        }
        BillingState::new(
            common::stripe::create_client(&config.stripe_secret_key),
            PriceResolver::from_config(&config.stripe_prices),
            &config.stripe_webhook_secret,
            &config.app_url,
        )
    }

    pub fn client(&self) -> &Client {
        self.provider.client()
    }

    pub fn provider(&self) -> &StripeBilling {
        &self.provider
    }

    pub fn prices(&self) -> &PriceResolver {
        &self.prices
    }

    pub fn webhook_secret(&self) -> &str {
        &self.webhook_secret
    }

    pub fn app_url(&self) -> &str {
        &self.app_url
    }
}
