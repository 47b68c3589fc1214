use stripe::{Client, CustomerId};

use crate::error::{AppError, Res};

pub fn create_client(secret_key: &str) -> Client {
    Client::new(secret_key)
}

pub fn parse_customer_id(customer_id: &str) -> Res<CustomerId> {
    customer_id
        .parse::<CustomerId>()
        .map_err(|e| AppError::Internal(format!("Invalid Stripe customer id {}: {}", customer_id, e)))
}
