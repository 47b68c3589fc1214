use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::{cookie::Key, web};
use common::env_config::Config;
use middleware::auth::{AuthMiddleware, AuthMode};

pub mod middleware {
    pub mod auth;
}

pub mod routes {
    pub mod auth;
    pub mod session;
    pub mod user;
}

pub mod services {
    pub mod auth;
    pub mod user;
}

pub mod dtos {
    pub mod auth;
}

/// Rejects requests without a valid bearer token.
pub fn auth_middleware(config: &Config) -> AuthMiddleware {
    AuthMiddleware::new(config.jwt_config.secret.clone(), AuthMode::Required)
}

/// Lets anonymous requests through, attaches claims when a token is sent.
pub fn optional_auth_middleware(config: &Config) -> AuthMiddleware {
    AuthMiddleware::new(config.jwt_config.secret.clone(), AuthMode::Optional)
}

/// Cookie session carrying the OAuth state and the issued token.
/// The signing key is derived from the JWT secret.
pub fn session_middleware(config: Arc<Config>) -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(
        CookieSessionStore::default(),
        Key::derive_from(config.jwt_config.secret.as_bytes()),
    )
    .cookie_secure(config.is_production())
    .cookie_http_only(true)
    .build()
}

/// OAuth and session routes, mounted under `/api`.
pub fn mount_auth() -> actix_web::Scope {
    web::scope("/auth")
        .service(routes::auth::get_google_authorize)
        .service(routes::auth::get_google_callback)
        .service(routes::session::get_session)
}

/// Profile routes, mounted under `/api/dashboard`.
pub fn mount_user() -> actix_web::Scope {
    web::scope("/me")
        .service(routes::user::get_me)
        .service(routes::user::patch_me)
        .service(routes::user::post_delete_me)
}
