use common::error::{AppError, Res};
use db::models::{link::Link, page::Page};
use sqlx::PgPool;

use crate::dtos::redirect::Interstitial;

/// Resolves a short code to the interstitial shown before redirecting and
/// records the click against the link owner.
pub async fn resolve(pool: &PgPool, short_code: &str) -> Res<Interstitial> {
    let short_code = short_code.trim();
    if short_code.is_empty() {
        return Err(AppError::BadRequest("Short code is required".to_string()));
    }

    let link = db::link::get_link_by_short_code(pool, short_code).await?;
    let link = ensure_reachable(link)?;

    db::click::insert_click(pool, link.id, link.user_id).await?;

    let page = db::page::get_page_by_link_id(pool, link.id).await?;
    Ok(interstitial_for(link, page))
}

/// Missing or deleted → 404, deactivated → 410.
pub fn ensure_reachable(link: Option<Link>) -> Res<Link> {
    let link = link
        .filter(|l| l.deleted_at.is_none())
        .ok_or_else(|| AppError::NotFound("Link not found".to_string()))?;
    if !link.is_active {
        return Err(AppError::Gone("This link has been deactivated".to_string()));
    }
    Ok(link)
}

pub fn interstitial_for(link: Link, page: Option<Page>) -> Interstitial {
    match page {
        Some(page) => Interstitial::Page {
            link_id: link.id,
            original_url: link.original_url,
            html: page.html,
            css: page.css,
        },
        None => Interstitial::Newsletter {
            link_id: link.id,
            original_url: link.original_url,
        },
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use serde_json::json;
    use uuid::Uuid;

    use super::*;

    fn link() -> Link {
        Link {
            id: Uuid::new_v4(),
            short_code: "abc123".to_string(),
            original_url: "https://example.com".to_string(),
            user_id: Some(Uuid::new_v4()),
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            deleted_at: None,
        }
    }

    #[test]
    fn unknown_and_deleted_links_are_not_found() {
        assert!(matches!(ensure_reachable(None), Err(AppError::NotFound(_))));

        let deleted = Link {
            deleted_at: Some(Utc::now()),
            ..link()
        };
        assert!(matches!(ensure_reachable(Some(deleted)), Err(AppError::NotFound(_))));
    }

    #[test]
    fn deactivated_links_are_gone() {
        let inactive = Link {
            is_active: false,
            ..link()
        };
        assert!(matches!(ensure_reachable(Some(inactive)), Err(AppError::Gone(_))));
    }

    #[test]
    fn link_without_page_falls_back_to_newsletter() {
        let link = link();
        let id = link.id;

        let json = serde_json::to_value(interstitial_for(link, None)).unwrap();
        assert_eq!(
            json,
            json!({ "kind": "newsletter", "link_id": id, "original_url": "https://example.com" })
        );
    }

    #[test]
    fn link_with_page_serves_the_page() {
        let link = link();
        let page = Page {
            id: Uuid::new_v4(),
            link_id: link.id,
            html: "<h1>Hi</h1>".to_string(),
            css: "h1{}".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        match interstitial_for(link, Some(page)) {
            Interstitial::Page { html, css, .. } => {
                assert_eq!(html, "<h1>Hi</h1>");
                assert_eq!(css, "h1{}");
            }
            other => panic!("expected page, got {:?}", other),
        }
    }
}
