use actix_web::web;

pub mod state;

pub mod routes {
    pub mod pay;
    pub mod sub;
}

pub mod services {
    pub mod pay;
    pub mod period;
    pub mod provider;
    pub mod reconcile;
    pub mod store;
    pub mod webhook;
}

pub mod dtos {
    pub mod pay;
    pub mod provider;
    pub mod sub;
    pub mod webhook;
}

pub mod models {
    pub mod plan;
}

pub mod misc {
    pub mod price;
}

pub use state::BillingState;

/// Authenticated billing routes, mounted under `/api/dashboard`.
pub fn mount_billing() -> actix_web::Scope {
    web::scope("/billing")
        .service(routes::pay::post_checkout)
        .service(routes::pay::post_portal)
        .service(routes::sub::get_subscription)
}

/// Stripe webhook endpoint, mounted under `/api`. Must stay outside auth.
pub fn mount_webhook() -> actix_web::Scope {
    web::scope("/stripe").service(routes::pay::post_webhook)
}
