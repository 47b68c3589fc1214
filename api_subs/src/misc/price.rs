use std::collections::HashMap;

use common::env_config::StripePrices;

use crate::models::plan::PlanTier;

/// Maps Stripe price ids to plan tiers. Unknown prices resolve to free.
#[derive(Debug, Clone, Default)]
pub struct PriceResolver {
    prices: HashMap<String, PlanTier>,
}

impl PriceResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty ids are ignored so an unset env var never matches.
    pub fn with_price(mut self, price_id: impl Into<String>, plan: PlanTier) -> Self {
        let price_id = price_id.into();
        if !price_id.trim().is_empty() {
            self.prices.insert(price_id, plan);
        }
        self
    }

    pub fn from_config(prices: &StripePrices) -> Self {
        PriceResolver::new()
            .with_price(&prices.core_monthly, PlanTier::Core)
            .with_price(&prices.core_annual, PlanTier::Core)
            .with_price(&prices.pro_monthly, PlanTier::Pro)
            .with_price(&prices.pro_annual, PlanTier::Pro)
    }

    pub fn resolve(&self, price_id: &str) -> PlanTier {
        match self.prices.get(price_id) {
            Some(plan) => *plan,
            None => {
                log::warn!("Unknown Stripe price id {}, falling back to free plan", price_id);
                PlanTier::Free
            }
        }
    }

    pub fn is_known(&self, price_id: &str) -> bool {
        self.prices.contains_key(price_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> PriceResolver {
        PriceResolver::from_config(&StripePrices {
            core_monthly: "price_core_m".to_string(),
            core_annual: "price_core_y".to_string(),
            pro_monthly: "price_pro_m".to_string(),
            pro_annual: String::new(),
        })
    }

    #[test]
    fn configured_prices_resolve_to_their_plan() {
        let resolver = resolver();
        assert_eq!(resolver.resolve("price_core_m"), PlanTier::Core);
        assert_eq!(resolver.resolve("price_core_y"), PlanTier::Core);
        assert_eq!(resolver.resolve("price_pro_m"), PlanTier::Pro);
    }

    #[test]
    fn unknown_price_resolves_to_free() {
        assert_eq!(resolver().resolve("price_mystery"), PlanTier::Free);
    }

    #[test]
    fn empty_price_ids_are_not_registered() {
        let resolver = resolver();
        assert!(!resolver.is_known(""));
        assert_eq!(resolver.resolve(""), PlanTier::Free);
    }
}
