use std::sync::Arc;

use api_subs::{
    models::plan::{PlanCatalog, PlanTier, Resource},
    services::{reconcile, store::SubscriptionStore},
};
use chrono::Utc;
use common::error::{AppError, Res};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitDecision {
    Allowed,
    Denied { limit: u32, current: i64 },
}

impl LimitDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, LimitDecision::Allowed)
    }
}

/// Answers "may this user create one more X" from the plan catalog and live counts.
pub struct LimitEnforcer {
    catalog: Arc<PlanCatalog>,
}

impl LimitEnforcer {
    pub fn new(catalog: Arc<PlanCatalog>) -> Self {
        LimitEnforcer { catalog }
    }

    pub fn catalog(&self) -> &PlanCatalog {
        &self.catalog
    }

    /// Denies once `current` has reached the limit. Unlimited resources always pass.
    pub fn check(&self, plan: PlanTier, resource: Resource, current: i64) -> LimitDecision {
        match self.catalog.limits(plan).limit_for(resource) {
            Some(limit) if current >= i64::from(limit) => LimitDecision::Denied { limit, current },
            _ => LimitDecision::Allowed,
        }
    }

    pub async fn plan_for(&self, pool: &PgPool, user_id: Uuid) -> Res<PlanTier> {
        let record = pool.find_by_user(user_id).await?;
        Ok(reconcile::effective_plan(record.as_ref(), Utc::now()))
    }

    pub async fn check_link_creation(&self, pool: &PgPool, user_id: Uuid) -> Res<()> {
        let plan = self.plan_for(pool, user_id).await?;
        let current = db::link::count_links_by_user(pool, user_id).await?;
        self.enforce(user_id, plan, Resource::Links, current)
    }

    pub async fn check_signup_capture(&self, pool: &PgPool, owner_id: Uuid) -> Res<()> {
        let plan = self.plan_for(pool, owner_id).await?;
        let current = db::signup::count_signups_by_owner(pool, owner_id).await?;
        self.enforce(owner_id, plan, Resource::EmailSignups, current)
    }

    /// Only for new pages, updating an existing page never counts.
    pub async fn check_page_creation(&self, pool: &PgPool, user_id: Uuid) -> Res<()> {
        let plan = self.plan_for(pool, user_id).await?;
        let current = db::page::count_pages_by_owner(pool, user_id).await?;
        self.enforce(user_id, plan, Resource::LandingPages, current)
    }

    fn enforce(&self, user_id: Uuid, plan: PlanTier, resource: Resource, current: i64) -> Res<()> {
        match self.check(plan, resource, current) {
            LimitDecision::Allowed => Ok(()),
            LimitDecision::Denied { limit, current } => {
                log::info!(
                    "User {} hit the {} limit on plan {} ({}/{})",
                    user_id,
                    resource,
                    plan,
                    current,
                    limit
                );
                Err(AppError::Forbidden(denial_message(resource)))
            }
        }
    }
}

fn denial_message(resource: Resource) -> String {
    match resource {
        Resource::Links => "Link limit reached. Please upgrade your plan.".to_string(),
        Resource::EmailSignups => {
            "This link has reached its email signup limit.".to_string()
        }
        Resource::LandingPages => {
            "Landing page limit reached. Please upgrade your plan.".to_string()
        }
        Resource::QrCodes => "QR code limit reached. Please upgrade your plan.".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enforcer() -> LimitEnforcer {
        LimitEnforcer::new(Arc::new(PlanCatalog::default()))
    }

    #[test]
    fn denies_exactly_at_the_limit() {
        let enforcer = enforcer();
        assert!(enforcer.check(PlanTier::Free, Resource::Links, 2).is_allowed());
        assert_eq!(
            enforcer.check(PlanTier::Free, Resource::Links, 3),
            LimitDecision::Denied { limit: 3, current: 3 }
        );
    }

    #[test]
    fn unlimited_resources_are_never_denied() {
        let enforcer = enforcer();
        assert!(enforcer.check(PlanTier::Core, Resource::EmailSignups, i64::MAX).is_allowed());
        assert!(enforcer.check(PlanTier::Pro, Resource::EmailSignups, 1_000_000).is_allowed());
    }

    #[test]
    fn zero_limit_denies_the_first_item() {
        assert!(!enforcer().check(PlanTier::Free, Resource::QrCodes, 0).is_allowed());
    }

    #[test]
    fn limits_follow_the_plan() {
        let enforcer = enforcer();
        assert!(!enforcer.check(PlanTier::Free, Resource::LandingPages, 1).is_allowed());
        assert!(enforcer.check(PlanTier::Core, Resource::LandingPages, 1).is_allowed());
        assert!(enforcer.check(PlanTier::Pro, Resource::Links, 2_999).is_allowed());
    }

    #[test]
    fn link_denial_uses_the_upgrade_message() {
        let result = enforcer().enforce(Uuid::new_v4(), PlanTier::Free, Resource::Links, 3);
        match result {
            Err(AppError::Forbidden(message)) => {
                assert_eq!(message, "Link limit reached. Please upgrade your plan.")
            }
            other => panic!("expected forbidden, got {:?}", other.is_ok()),
        }
    }
}
