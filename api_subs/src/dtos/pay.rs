use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    pub price_id: String,
    pub plan_name: String,
}

#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub url: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_upgrade: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PortalResponse {
    pub url: String,
}

/// Everything needed to open a subscription checkout for one user.
pub struct CheckoutSessionRequest<'a> {
    pub user_id: Uuid,
    pub email: &'a str,
    pub price_id: &'a str,
    pub plan_name: &'a str,
    pub success_url: String,
    pub cancel_url: String,
}
