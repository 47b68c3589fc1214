use api_subs::{
    misc::price::PriceResolver,
    services::{provider::BillingProvider, reconcile},
};
use common::error::{AppError, Res};
use db::{dtos::user::UserSignInRequest, models::user::User};
use sqlx::PgPool;
use uuid::Uuid;

use crate::dtos::auth::OAuthUserData;

pub const MAX_NAME_LEN: usize = 100;

/// Upserts the user by email, reactivating a soft-deleted account, then pulls
/// the latest subscription state from the billing provider. A sync failure
/// never blocks sign-in.
pub async fn sign_in<P: BillingProvider + ?Sized>(
    pool: &PgPool,
    provider: &P,
    prices: &PriceResolver,
    user_data: OAuthUserData,
) -> Res<User> {
    let user = db::user::upsert_user_on_sign_in(
        pool,
        UserSignInRequest {
            email: user_data.email,
            name: user_data.name,
            image: user_data.image,
        },
    )
    .await?;

    if !reconcile::sync_subscription_from_provider(pool, provider, prices, user.id).await {
        log::debug!("[sync] nothing synced for user {}", user.id);
    }

    Ok(user)
}

pub async fn get_user_by_id(pool: &PgPool, user_id: Uuid) -> Res<User> {
    db::user::get_user_by_id(pool, user_id).await
}

pub async fn rename_user(pool: &PgPool, user_id: Uuid, name: &str) -> Res<User> {
    let name = validate_name(name)?;
    db::user::update_user_name(pool, user_id, name).await
}

pub async fn delete_user(pool: &PgPool, user_id: Uuid) -> Res<()> {
    if db::user::soft_delete_user(pool, user_id).await? {
        log::info!("User {} deleted their account", user_id);
        Ok(())
    } else {
        Err(AppError::NotFound("User not found".to_string()))
    }
}

pub fn validate_name(name: &str) -> Res<&str> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::BadRequest("Name is required".to_string()));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(AppError::BadRequest(format!(
            "Name must be at most {} characters",
            MAX_NAME_LEN
        )));
    }
    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_is_trimmed() {
        assert_eq!(validate_name("  Ada Lovelace ").unwrap(), "Ada Lovelace");
    }

    #[test]
    fn blank_or_oversized_names_are_rejected() {
        assert!(matches!(validate_name("   "), Err(AppError::BadRequest(_))));
        assert!(matches!(
            validate_name(&"a".repeat(MAX_NAME_LEN + 1)),
            Err(AppError::BadRequest(_))
        ));
    }
}
