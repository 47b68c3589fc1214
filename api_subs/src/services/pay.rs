use std::collections::HashMap;

use common::error::{AppError, Res};
use stripe::{
    BillingPortalSession, CheckoutSession, CheckoutSessionMode, Client, CreateBillingPortalSession,
    CreateCheckoutSession, CreateCheckoutSessionLineItems, CreateCheckoutSessionSubscriptionData,
};

use crate::dtos::pay::CheckoutSessionRequest;

/// Opens a subscription checkout. `userId` and `planName` are attached to both
/// the session and the subscription it creates, the webhook reads them back.
pub async fn create_subscription_session(
    client: &Client,
    req: CheckoutSessionRequest<'_>,
) -> Res<CheckoutSession> {
    let metadata = HashMap::from([
        ("userId".to_string(), req.user_id.to_string()),
        ("planName".to_string(), req.plan_name.to_string()),
    ]);
    let client_reference_id = req.user_id.to_string();

    let params = CreateCheckoutSession {
        line_items: Some(vec![CreateCheckoutSessionLineItems {
            price: Some(req.price_id.to_string()),
            quantity: Some(1),
            ..Default::default()
        }]),
        mode: Some(CheckoutSessionMode::Subscription),
        success_url: Some(&req.success_url),
        cancel_url: Some(&req.cancel_url),
        customer_email: Some(req.email),
        client_reference_id: Some(&client_reference_id),
        metadata: Some(metadata.clone()),
        subscription_data: Some(CreateCheckoutSessionSubscriptionData {
            metadata: Some(metadata),
            ..Default::default()
        }),
        ..Default::default()
    };

    let session = CheckoutSession::create(client, params).await.map_err(|e| {
        log::error!("Failed to create checkout session for {}: {}", req.user_id, e);
        AppError::from(e)
    })?;

    log::info!(
        "Created checkout session {} for user {} ({})",
        session.id,
        req.user_id,
        req.plan_name
    );
    Ok(session)
}

pub async fn create_portal_session(
    client: &Client,
    customer_id: &str,
    return_url: &str,
) -> Res<BillingPortalSession> {
    let customer_id = common::stripe::parse_customer_id(customer_id)?;
    let mut params = CreateBillingPortalSession::new(customer_id);
    params.return_url = Some(return_url);

    BillingPortalSession::create(client, params)
        .await
        .map_err(AppError::from)
}
