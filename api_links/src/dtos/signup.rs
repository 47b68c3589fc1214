use api_subs::models::plan::PlanTier;
use db::models::signup::OwnerSignup;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct SignupListResponse {
    pub signups: Vec<OwnerSignup>,
    pub plan: PlanTier,
    pub total: i64,
    /// True when the plan hides older rows.
    pub truncated: bool,
}
