use std::sync::Arc;

use api_subs::models::plan::PlanCatalog;
use enforcer::LimitEnforcer;

pub mod enforcer;

pub fn enforcer(catalog: Arc<PlanCatalog>) -> LimitEnforcer {
    LimitEnforcer::new(catalog)
}
