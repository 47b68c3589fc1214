use common::{
    env_config::OAuthProviderClient,
    error::{AppError, Res},
};
use oauth2::{
    AuthUrl, Client, ClientId, ClientSecret, EmptyExtraTokenFields, EndpointNotSet, EndpointSet,
    RedirectUrl, RevocationErrorResponseType, StandardErrorResponse, StandardRevocableToken,
    StandardTokenIntrospectionResponse, StandardTokenResponse, TokenUrl,
    basic::{BasicClient, BasicErrorResponseType, BasicTokenType},
};
use serde_json::Value;

use crate::dtos::auth::OAuthUserData;

pub const GOOGLE_SCOPES: [&str; 2] = ["email", "profile"];

const GOOGLE_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v3/userinfo";

pub type GoogleClient = Client<
    StandardErrorResponse<BasicErrorResponseType>,
    StandardTokenResponse<EmptyExtraTokenFields, BasicTokenType>,
    StandardTokenIntrospectionResponse<EmptyExtraTokenFields, BasicTokenType>,
    StandardRevocableToken,
    StandardErrorResponse<RevocationErrorResponseType>,
    EndpointSet,
    EndpointNotSet,
    EndpointNotSet,
    EndpointNotSet,
    EndpointSet,
>;

/// Create the Google OAuth client from configuration.
///
/// # Returns
///
/// An error when one of the configured endpoint URLs does not parse.
pub fn create_oauth_client(provider: &OAuthProviderClient) -> Res<GoogleClient> {
    let auth_url = AuthUrl::new(provider.auth_url.clone())
        .map_err(|e| AppError::Internal(format!("Invalid authorization endpoint URL: {}", e)))?;
    let token_url = TokenUrl::new(provider.token_url.clone())
        .map_err(|e| AppError::Internal(format!("Invalid token endpoint URL: {}", e)))?;
    let redirect_url = RedirectUrl::new(provider.redirect_uri.clone())
        .map_err(|e| AppError::Internal(format!("Invalid redirect URL: {}", e)))?;

    Ok(BasicClient::new(ClientId::new(provider.client_id.clone()))
        .set_client_secret(ClientSecret::new(provider.client_secret.clone()))
        .set_auth_uri(auth_url)
        .set_token_uri(token_url)
        .set_redirect_uri(redirect_url))
}

/// Fetches the signed-in user's profile from Google.
pub async fn fetch_google_user_data(access_token: &str) -> Res<OAuthUserData> {
    let response = reqwest::Client::new()
        .get(GOOGLE_USERINFO_URL)
        .header("Authorization", format!("Bearer {}", access_token))
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(AppError::Internal(format!(
            "Google API returned error status: {}",
            response.status()
        )));
    }

    let google_user: Value = response.json().await?;
    parse_google_user(&google_user)
}

/// Accounts without an email cannot sign in, everything else is optional.
pub fn parse_google_user(google_user: &Value) -> Res<OAuthUserData> {
    let email = google_user["email"]
        .as_str()
        .map(|e| e.trim().to_lowercase())
        .filter(|e| !e.is_empty())
        .ok_or_else(|| AppError::Unauthorized("Google account has no email".to_string()))?;

    let non_empty = |key: &str| {
        google_user[key]
            .as_str()
            .filter(|v| !v.trim().is_empty())
            .map(str::to_string)
    };

    Ok(OAuthUserData {
        email,
        name: non_empty("name"),
        image: non_empty("picture"),
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn google_profile_is_normalized() {
        let user = parse_google_user(&json!({
            "sub": "1234",
            "email": " Ada@Example.com ",
            "name": "Ada Lovelace",
            "picture": "https://lh3.googleusercontent.com/a/photo"
        }))
        .unwrap();

        assert_eq!(user.email, "ada@example.com");
        assert_eq!(user.name.as_deref(), Some("Ada Lovelace"));
        assert_eq!(user.image.as_deref(), Some("https://lh3.googleusercontent.com/a/photo"));
    }

    #[test]
    fn profile_without_email_is_rejected() {
        assert!(matches!(
            parse_google_user(&json!({ "sub": "1234", "name": "Ada" })),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[test]
    fn blank_name_is_treated_as_missing() {
        let user = parse_google_user(&json!({ "email": "ada@example.com", "name": "  " })).unwrap();
        assert_eq!(user.name, None);
        assert_eq!(user.image, None);
    }

    #[test]
    fn client_rejects_malformed_endpoints() {
        let provider = OAuthProviderClient {
            client_id: "id".to_string(),
            client_secret: "secret".to_string(),
            auth_url: "not a url".to_string(),
            token_url: "https://oauth2.googleapis.com/token".to_string(),
            redirect_uri: "http://localhost:8080/api/auth/oauth/google/callback".to_string(),
        };
        assert!(create_oauth_client(&provider).is_err());
    }
}
