use std::sync::Arc;

use actix_session::Session;
use actix_web::{HttpResponse, Responder, get, http::header::LOCATION, web};
use api_subs::BillingState;
use common::{
    env_config::Config,
    error::{AppError, Res},
    jwt::{self, ClaimsSpec},
};
use oauth2::{AuthorizationCode, CsrfToken, Scope, TokenResponse, reqwest};
use sqlx::PgPool;

use crate::{
    dtos::auth::{AuthResponse, OAuthCallbackQuery},
    services,
};

const OAUTH_STATE_KEY: &str = "oauth_state";

/// Starts Google sign-in.
///
/// # Output
/// - 302 redirect to Google's consent screen. The CSRF state is kept in the cookie session.
///
/// # Frontend Example
/// ```javascript
/// <a href="/api/auth/oauth/google">Sign in with Google</a>
/// ```
#[get("/oauth/google")]
pub async fn get_google_authorize(config: web::Data<Arc<Config>>, session: Session) -> Res<impl Responder> {
    let client = services::auth::create_oauth_client(&config.google_client)?;

    let (auth_url, csrf_token) = client
        .authorize_url(CsrfToken::new_random)
        .add_scopes(
            services::auth::GOOGLE_SCOPES
                .into_iter()
                .map(|s| Scope::new(s.to_string())),
        )
        .url();

    session
        .insert(OAUTH_STATE_KEY, csrf_token.secret())
        .map_err(|_| AppError::Internal("Failed to store OAuth state".to_string()))?;

    Ok(HttpResponse::Found()
        .append_header((LOCATION, auth_url.to_string()))
        .finish())
}

/// Handles Google's redirect after consent.
///
/// # Input
/// - `query`: `code` and `state` from Google
///
/// # Output
/// - 302 redirect to `WEB_APP_AUTH_CALLBACK_URL` with `token` and `user` in the session
/// - 401 when the state does not match the one issued by `/oauth/google`
///
/// # Note
/// Upserting the user reactivates a soft-deleted account. The subscription is
/// re-synced from Stripe on every sign-in; a Stripe outage does not block it.
#[get("/oauth/google/callback")]
pub async fn get_google_callback(
    query: web::Query<OAuthCallbackQuery>,
    config: web::Data<Arc<Config>>,
    pool: web::Data<Arc<PgPool>>,
    billing: web::Data<Arc<BillingState>>,
    session: Session,
) -> Res<impl Responder> {
    let expected_state = session
        .remove_as::<String>(OAUTH_STATE_KEY)
        .and_then(Result::ok)
        .ok_or_else(|| AppError::Unauthorized("Missing OAuth state".to_string()))?;
    if expected_state != query.state {
        return Err(AppError::Unauthorized("OAuth state mismatch".to_string()));
    }

    let client = services::auth::create_oauth_client(&config.google_client)?;
    let http_client = reqwest::ClientBuilder::new()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .map_err(|e| AppError::Internal(format!("Failed to build HTTP client. {}", e)))?;

    let token = client
        .exchange_code(AuthorizationCode::new(query.code.clone()))
        .request_async(&http_client)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to exchange code. {}", e)))?;

    let user_data = services::auth::fetch_google_user_data(token.access_token().secret()).await?;
    let user = services::user::sign_in(&pool, billing.provider(), billing.prices(), user_data).await?;

    let token = jwt::generate_jwt(
        ClaimsSpec {
            user_id: user.id,
            email: user.email.clone(),
        },
        &config.jwt_config,
    )?;
    let auth_response = AuthResponse { token, user };

    let user_string = serde_json::to_string(&auth_response.user)
        .map_err(|_| AppError::Internal("Failed to serialize user".to_string()))?;

    session
        .insert("token", &auth_response.token)
        .map_err(|_| AppError::Internal("Failed to insert token cookie".to_string()))?;
    session
        .insert("user", &user_string)
        .map_err(|_| AppError::Internal("Failed to insert user cookie".to_string()))?;

    log::info!("User {} signed in", auth_response.user.id);

    Ok(HttpResponse::Found()
        .append_header((LOCATION, config.web_app_auth_callback_url.as_str()))
        .finish())
}
