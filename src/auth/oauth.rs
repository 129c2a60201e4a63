use oauth2::basic::BasicClient;
use oauth2::{
    AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, EndpointNotSet, EndpointSet,
    PkceCodeChallenge, PkceCodeVerifier, RedirectUrl, Scope, TokenResponse, TokenUrl,
};
use serde::Deserialize;

use crate::db::models::social_app::SocialApp;

pub const GOOGLE_PROVIDER: &str = "google";

pub const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_USERINFO_URL: &str = "https://openidconnect.googleapis.com/v1/userinfo";
pub const GOOGLE_SCOPES: [&str; 3] = ["openid", "email", "profile"];

#[derive(Debug, thiserror::Error)]
pub enum OAuthError {
    #[error("Invalid OAuth URL: {0}")]
    InvalidUrl(#[from] oauth2::url::ParseError),
    #[error("Token exchange failed: {0}")]
    TokenExchange(String),
    #[error("User info request failed: {0}")]
    UserInfo(#[from] reqwest::Error),
    #[error("Missing `{0}` in callback")]
    MissingParameter(&'static str),
    #[error("Provider returned an error: {0}")]
    ProviderDenied(String),
    #[error("CSRF state mismatch")]
    StateMismatch,
}

pub type GoogleClient =
    BasicClient<EndpointSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;

/// Where Google sends the browser back for a given site domain.
pub fn callback_url(domain: &str) -> String {
    redirect_url("http", domain)
}

pub fn redirect_url(scheme: &str, host: &str) -> String {
    format!("{scheme}://{host}/accounts/google/login/callback/")
}

/// Build the Google OAuth2 client from a stored social application.
pub fn build_client(app: &SocialApp, redirect_url: &str) -> Result<GoogleClient, OAuthError> {
    let client = BasicClient::new(ClientId::new(app.client_id.clone()))
        .set_client_secret(ClientSecret::new(app.secret.clone()))
        .set_auth_uri(AuthUrl::new(GOOGLE_AUTH_URL.to_string())?)
        .set_token_uri(TokenUrl::new(GOOGLE_TOKEN_URL.to_string())?)
        .set_redirect_uri(RedirectUrl::new(redirect_url.to_string())?);
    Ok(client)
}

/// Consent URL plus the secrets the callback needs to check.
#[derive(Debug)]
pub struct AuthorizationRequest {
    pub url: oauth2::url::Url,
    pub csrf_state: String,
    pub pkce_verifier: String,
}

pub fn authorization_request(client: &GoogleClient) -> AuthorizationRequest {
    let (challenge, verifier) = PkceCodeChallenge::new_random_sha256();

    let (url, csrf) = client
        .authorize_url(CsrfToken::new_random)
        .add_scopes(GOOGLE_SCOPES.iter().map(|s| Scope::new((*s).to_string())))
        .set_pkce_challenge(challenge)
        .url();

    AuthorizationRequest {
        url,
        csrf_state: csrf.secret().clone(),
        pkce_verifier: verifier.secret().clone(),
    }
}

/// The `state` echoed by the provider must equal the one stored before redirecting.
pub fn verify_state(expected: Option<&str>, received: Option<&str>) -> Result<(), OAuthError> {
    let received = received.ok_or(OAuthError::MissingParameter("state"))?;
    match expected {
        Some(expected) if !expected.is_empty() && expected == received => Ok(()),
        _ => Err(OAuthError::StateMismatch),
    }
}

/// Exchange the authorization code; returns the access token.
pub async fn exchange_code(
    client: &GoogleClient,
    http_client: &reqwest::Client,
    code: String,
    pkce_verifier: String,
) -> Result<String, OAuthError> {
    let token = client
        .exchange_code(AuthorizationCode::new(code))
        .set_pkce_verifier(PkceCodeVerifier::new(pkce_verifier))
        .request_async(http_client)
        .await
        .map_err(|e| OAuthError::TokenExchange(e.to_string()))?;

    Ok(token.access_token().secret().clone())
}

#[derive(Debug, Clone, Deserialize)]
pub struct GoogleProfile {
    pub sub: String,
    pub email: Option<String>,
    #[serde(default)]
    pub email_verified: bool,
    pub name: Option<String>,
}

pub async fn fetch_profile(
    http_client: &reqwest::Client,
    access_token: &str,
) -> Result<GoogleProfile, OAuthError> {
    let profile = http_client
        .get(GOOGLE_USERINFO_URL)
        .bearer_auth(access_token)
        .header("Accept", "application/json")
        .send()
        .await?
        .error_for_status()?
        .json::<GoogleProfile>()
        .await?;

    tracing::debug!(sub = %profile.sub, "Fetched Google profile");
    Ok(profile)
}
