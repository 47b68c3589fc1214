//! Period-end extraction. Stripe has moved `current_period_end` between API
//! versions, so the value is looked up through an ordered list of strategies
//! and the first hit wins.

use chrono::{DateTime, Duration, Months, Utc};

use crate::dtos::provider::ProviderSubscription;

pub type PeriodEndStrategy = fn(&ProviderSubscription) -> Option<DateTime<Utc>>;

/// Item field, then legacy top-level field, then anchor + interval.
pub const FULL_CHAIN: &[PeriodEndStrategy] = &[from_first_item, from_subscription, from_billing_anchor];

/// Item field, then legacy top-level field. No computation.
pub const DIRECT_ONLY: &[PeriodEndStrategy] = &[from_first_item, from_subscription];

pub fn resolve_period_end(
    sub: &ProviderSubscription,
    strategies: &[PeriodEndStrategy],
) -> Option<DateTime<Utc>> {
    strategies.iter().find_map(|strategy| strategy(sub))
}

pub fn from_first_item(sub: &ProviderSubscription) -> Option<DateTime<Utc>> {
    sub.first_item()?.current_period_end.and_then(timestamp)
}

pub fn from_subscription(sub: &ProviderSubscription) -> Option<DateTime<Utc>> {
    sub.current_period_end.and_then(timestamp)
}

pub fn from_billing_anchor(sub: &ProviderSubscription) -> Option<DateTime<Utc>> {
    let anchor = sub.billing_cycle_anchor.and_then(timestamp)?;
    let recurring = sub.first_item()?.price.as_ref()?.recurring.as_ref()?;
    add_interval(anchor, &recurring.interval, recurring.interval_count.unwrap_or(1))
}

/// Calendar-aware: months clamp to the last day of shorter months.
pub fn add_interval(anchor: DateTime<Utc>, interval: &str, count: u32) -> Option<DateTime<Utc>> {
    match interval {
        "month" => anchor.checked_add_months(Months::new(count)),
        "year" => anchor.checked_add_months(Months::new(count.checked_mul(12)?)),
        "week" => anchor.checked_add_signed(Duration::weeks(i64::from(count))),
        "day" => anchor.checked_add_signed(Duration::days(i64::from(count))),
        other => {
            log::warn!("Unsupported billing interval {}", other);
            None
        }
    }
}

/// Zero is treated as absent, Stripe never reports the epoch as a real period end.
pub(crate) fn timestamp(secs: i64) -> Option<DateTime<Utc>> {
    if secs <= 0 {
        return None;
    }
    DateTime::<Utc>::from_timestamp(secs, 0)
}
