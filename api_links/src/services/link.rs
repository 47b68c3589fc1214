use common::error::{AppError, Res};
use db::{
    dtos::link::LinkCreateRequest,
    models::link::{Link, LinkWithStats},
};
use limiter::enforcer::LimitEnforcer;
use sqlx::PgPool;
use uuid::Uuid;

use crate::misc::{short_code, validate};

pub const SHORT_CODE_ATTEMPTS: usize = 10;

/// Creates a short link. Anonymous callers are not plan-limited.
pub async fn shorten(
    pool: &PgPool,
    enforcer: &LimitEnforcer,
    user_id: Option<Uuid>,
    raw_url: &str,
) -> Res<Link> {
    let original_url = validate::validate_url(raw_url)?;

    if let Some(user_id) = user_id {
        enforcer.check_link_creation(pool, user_id).await?;
    }

    let short_code = unique_short_code(pool).await?;
    let link = db::link::insert_link(
        pool,
        LinkCreateRequest {
            short_code,
            original_url,
            user_id,
        },
    )
    .await?;

    log::info!(
        "Created link {} for {}",
        link.short_code,
        user_id.map_or_else(|| "anonymous".to_string(), |id| id.to_string())
    );
    Ok(link)
}

async fn unique_short_code(pool: &PgPool) -> Res<String> {
    for _ in 0..SHORT_CODE_ATTEMPTS {
        let code = short_code::generate();
        if !db::link::exists_short_code(pool, &code).await? {
            return Ok(code);
        }
    }
    Err(AppError::Internal(
        "Failed to generate unique short code".to_string(),
    ))
}

/// Loads a live link and checks the caller owns it.
pub async fn get_owned_link(pool: &PgPool, link_id: Uuid, user_id: Uuid) -> Res<Link> {
    let link = db::link::get_link_by_id(pool, link_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Link not found".to_string()))?;
    ensure_owner(&link, user_id)?;
    Ok(link)
}

pub fn ensure_owner(link: &Link, user_id: Uuid) -> Res<()> {
    if link.user_id == Some(user_id) {
        Ok(())
    } else {
        Err(AppError::Forbidden("You do not own this link".to_string()))
    }
}

pub async fn toggle_link(pool: &PgPool, link_id: Uuid, user_id: Uuid) -> Res<Link> {
    let link = get_owned_link(pool, link_id, user_id).await?;
    db::link::set_link_active(pool, link.id, !link.is_active).await
}

pub async fn delete_link(pool: &PgPool, link_id: Uuid, user_id: Uuid) -> Res<()> {
    let link = get_owned_link(pool, link_id, user_id).await?;
    db::link::soft_delete_link(pool, link.id).await
}

pub async fn list_links(pool: &PgPool, user_id: Uuid, deactivated: bool) -> Res<Vec<LinkWithStats>> {
    db::link::list_links_with_stats(pool, user_id, !deactivated).await
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn link(owner: Option<Uuid>) -> Link {
        Link {
            id: Uuid::new_v4(),
            short_code: "abc123".to_string(),
            original_url: "https://example.com".to_string(),
            user_id: owner,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            deleted_at: None,
        }
    }

    #[test]
    fn owner_passes_the_ownership_check() {
        let owner = Uuid::new_v4();
        assert!(ensure_owner(&link(Some(owner)), owner).is_ok());
    }

    #[test]
    fn strangers_and_anonymous_links_are_forbidden() {
        let caller = Uuid::new_v4();
        assert!(matches!(
            ensure_owner(&link(Some(Uuid::new_v4())), caller),
            Err(AppError::Forbidden(_))
        ));
        assert!(matches!(ensure_owner(&link(None), caller), Err(AppError::Forbidden(_))));
    }
}
