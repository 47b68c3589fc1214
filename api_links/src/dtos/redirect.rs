use serde::Serialize;
use uuid::Uuid;

/// What the visitor sees before being sent on to `original_url`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Interstitial {
    Page {
        link_id: Uuid,
        original_url: String,
        html: String,
        css: String,
    },
    Newsletter {
        link_id: Uuid,
        original_url: String,
    },
}
