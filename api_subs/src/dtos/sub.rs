use db::models::subscription::SubscriptionRecord;
use serde::Serialize;

use crate::models::plan::{PlanEntry, PlanLimits, PlanTier};

#[derive(Debug, Serialize)]
pub struct PlansResponse {
    pub plans: Vec<PlanEntry>,
}

#[derive(Debug, Serialize)]
pub struct Usage {
    pub links: i64,
    pub email_signups: i64,
    pub landing_pages: i64,
}

#[derive(Debug, Serialize)]
pub struct SubscriptionOverview {
    pub subscription: Option<SubscriptionRecord>,
    pub plan: PlanTier,
    pub limits: PlanLimits,
    pub usage: Usage,
}
