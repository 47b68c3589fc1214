use async_trait::async_trait;
use common::error::Res;
use db::{
    dtos::subscription::{SubscriptionUpdate, SubscriptionUpsert},
    models::subscription::SubscriptionRecord,
};
use sqlx::PgPool;
use uuid::Uuid;

/// Persistence seam for subscription records. Creation is keyed by user id,
/// every later mutation by the Stripe subscription id.
#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    async fn find_by_user(&self, user_id: Uuid) -> Res<Option<SubscriptionRecord>>;

    async fn upsert_by_user(
        &self,
        user_id: Uuid,
        data: &SubscriptionUpsert,
    ) -> Res<SubscriptionRecord>;

    /// `None` when no row carries the subscription id.
    async fn update_by_subscription_id(
        &self,
        stripe_subscription_id: &str,
        data: &SubscriptionUpdate,
    ) -> Res<Option<SubscriptionRecord>>;

    async fn mark_canceled(&self, stripe_subscription_id: &str) -> Res<Option<SubscriptionRecord>>;
}

#[async_trait]
impl SubscriptionStore for PgPool {
    async fn find_by_user(&self, user_id: Uuid) -> Res<Option<SubscriptionRecord>> {
        db::subscription::get_subscription_by_user_id(self, user_id).await
    }

    async fn upsert_by_user(
        &self,
        user_id: Uuid,
        data: &SubscriptionUpsert,
    ) -> Res<SubscriptionRecord> {
        db::subscription::upsert_subscription_by_user_id(self, user_id, data).await
    }

    async fn update_by_subscription_id(
        &self,
        stripe_subscription_id: &str,
        data: &SubscriptionUpdate,
    ) -> Res<Option<SubscriptionRecord>> {
        db::subscription::update_subscription_by_stripe_id(self, stripe_subscription_id, data).await
    }

    async fn mark_canceled(&self, stripe_subscription_id: &str) -> Res<Option<SubscriptionRecord>> {
        db::subscription::update_subscription_status_by_stripe_id(
            self,
            stripe_subscription_id,
            super::reconcile::CANCELED_STATUS,
        )
        .await
    }
}

#[cfg(test)]
pub(crate) mod memory {
    use std::{collections::HashMap, sync::Mutex};

    use chrono::{DateTime, Utc};

    use super::*;

    /// Keyed by user id, mirroring the unique constraint on the table.
    #[derive(Default)]
    pub struct MemoryStore {
        rows: Mutex<HashMap<Uuid, SubscriptionRecord>>,
    }

    impl MemoryStore {
        pub fn with_record(record: SubscriptionRecord) -> Self {
            let store = MemoryStore::default();
            store.rows.lock().unwrap().insert(record.user_id, record);
            store
        }

        pub fn len(&self) -> usize {
            self.rows.lock().unwrap().len()
        }

        pub fn get(&self, user_id: Uuid) -> Option<SubscriptionRecord> {
            self.rows.lock().unwrap().get(&user_id).cloned()
        }

        fn stamp() -> DateTime<Utc> {
            DateTime::<Utc>::from_timestamp(0, 0).unwrap()
        }
    }

    #[async_trait]
    impl SubscriptionStore for MemoryStore {
        async fn find_by_user(&self, user_id: Uuid) -> Res<Option<SubscriptionRecord>> {
            Ok(self.get(user_id))
        }

        async fn upsert_by_user(
            &self,
            user_id: Uuid,
            data: &SubscriptionUpsert,
        ) -> Res<SubscriptionRecord> {
            let mut rows = self.rows.lock().unwrap();
            let id = rows.get(&user_id).map(|r| r.id).unwrap_or_else(Uuid::new_v4);
            let record = SubscriptionRecord {
                id,
                user_id,
                stripe_customer_id: data.stripe_customer_id.clone(),
                stripe_subscription_id: data.stripe_subscription_id.clone(),
                stripe_price_id: data.stripe_price_id.clone(),
                plan: data.plan.clone(),
                status: data.status.clone(),
                current_period_end: data.current_period_end,
                cancel_at: data.cancel_at,
                created_at: Self::stamp(),
                updated_at: Self::stamp(),
            };
            rows.insert(user_id, record.clone());
            Ok(record)
        }

        async fn update_by_subscription_id(
            &self,
            stripe_subscription_id: &str,
            data: &SubscriptionUpdate,
        ) -> Res<Option<SubscriptionRecord>> {
            let mut rows = self.rows.lock().unwrap();
            let Some(record) = rows
                .values_mut()
                .find(|r| r.stripe_subscription_id == stripe_subscription_id)
            else {
                return Ok(None);
            };
            record.stripe_price_id = data.stripe_price_id.clone();
            record.plan = data.plan.clone();
            record.status = data.status.clone();
            record.current_period_end = data.current_period_end;
            record.cancel_at = data.cancel_at;
            Ok(Some(record.clone()))
        }

        async fn mark_canceled(
            &self,
            stripe_subscription_id: &str,
        ) -> Res<Option<SubscriptionRecord>> {
            let mut rows = self.rows.lock().unwrap();
            let Some(record) = rows
                .values_mut()
                .find(|r| r.stripe_subscription_id == stripe_subscription_id)
            else {
                return Ok(None);
            };
            record.status = crate::services::reconcile::CANCELED_STATUS.to_string();
            Ok(Some(record.clone()))
        }
    }
}
