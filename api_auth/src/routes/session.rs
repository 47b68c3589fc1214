use actix_session::Session;
use actix_web::{Responder, get};
use common::{
    error::{AppError, Res},
    http::Success,
};
use db::models::user::User;

use crate::dtos::auth::AuthResponse;

/// Hands the token issued during the OAuth callback to the web app.
///
/// # Output
/// - `{ "token": "...", "user": {...} }`
/// - 401 when no sign-in happened in this session
///
/// # Frontend Example
/// ```javascript
/// const response = await fetch('/api/auth/session', { credentials: 'include' });
/// if (response.ok) {
///   const { token, user } = await response.json();
///   localStorage.setItem('authToken', token);
/// }
/// ```
#[get("/session")]
pub async fn get_session(session: Session) -> Res<impl Responder> {
    let user = session
        .get::<String>("user")
        .map_err(|_| AppError::BadRequest("Session user error".to_string()))?
        .ok_or_else(|| AppError::Unauthorized("No user data found".to_string()))?;
    let token = session
        .get::<String>("token")
        .map_err(|_| AppError::BadRequest("Session token error".to_string()))?
        .ok_or_else(|| AppError::Unauthorized("No session token found".to_string()))?;

    let user = serde_json::from_str::<User>(&user)
        .map_err(|_| AppError::Internal("Failed to parse user json".to_string()))?;

    Success::ok(AuthResponse { token, user })
}

#[cfg(test)]
mod tests {
    use actix_session::{SessionMiddleware, storage::CookieSessionStore};
    use actix_web::{App, cookie::Key, http::StatusCode, test};

    use super::*;

    #[actix_web::test]
    async fn empty_session_is_unauthorized() {
        let app = test::init_service(
            App::new()
                .wrap(SessionMiddleware::new(
                    CookieSessionStore::default(),
                    Key::from(&[7u8; 64]),
                ))
                .service(get_session),
        )
        .await;

        let resp = test::call_service(&app, test::TestRequest::get().uri("/session").to_request()).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }
}
