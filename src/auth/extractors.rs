use axum::extract::FromRequestParts;
use axum::http::{HeaderMap, Uri, header, request::Parts};
use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};

use crate::app::AppState;
use crate::db::connection::get_connection;
use crate::db::models::user::User;
use crate::error::AppError;

pub const SESSION_COOKIE: &str = "sessionid";
pub const OAUTH_STATE_COOKIE: &str = "oauth_state";
pub const OAUTH_PKCE_COOKIE: &str = "oauth_pkce";
pub const OAUTH_NEXT_COOKIE: &str = "oauth_next";

const OAUTH_FLOW_MINUTES: i64 = 15;

/// Account attached to the request by [`require_login`](super::middleware::require_login).
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Extracteur pour les pages publiques qui s'adaptent à l'utilisateur connecté.
/// Never rejects an anonymous request.
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<User>);

/// Token from `Authorization: Bearer <JWT>` or, failing that, the session cookie.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(ToOwned::to_owned)
        .or_else(|| {
            let jar = CookieJar::from_headers(headers);
            jar.get(SESSION_COOKIE)
                .map(|cookie| cookie.value().to_owned())
        })
}

/// Looks up the account behind the request's session, if any.
pub fn resolve_user(state: &AppState, headers: &HeaderMap) -> Result<Option<User>, AppError> {
    let Some(token) = session_token(headers) else {
        return Ok(None);
    };

    let mut conn = get_connection(&state.pool)?;
    state.auth.user_from_token(&mut conn, &token)
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<CurrentUser>().cloned() {
            return Ok(user);
        }

        match resolve_user(state, &parts.headers)? {
            Some(user) => Ok(Self(user)),
            None => Err(login_redirect(&state.config.login_url, &parts.uri)),
        }
    }
}

impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        if let Some(CurrentUser(user)) = parts.extensions.get::<CurrentUser>() {
            return Ok(Self(Some(user.clone())));
        }

        resolve_user(state, &parts.headers).map(Self)
    }
}

/// Redirection vers la page de login, en conservant la destination dans `next`.
pub fn login_redirect(login_url: &str, uri: &Uri) -> AppError {
    let next = uri
        .path_and_query()
        .map_or_else(|| uri.path().to_string(), ToString::to_string);
    let encoded: String = url::form_urlencoded::byte_serialize(next.as_bytes()).collect();

    AppError::LoginRequired {
        location: format!("{login_url}?next={}", encoded.replace("%2F", "/")),
    }
}

/// Only same-site relative paths are followed after login.
pub fn safe_next(next: Option<&str>) -> &str {
    match next {
        Some(path) if path.starts_with('/') && !path.starts_with("//") && !path.contains('\\') => {
            path
        }
        _ => "/",
    }
}

pub fn session_cookie(token: String, secure: bool, max_age_hours: i64) -> Cookie<'static> {
    Cookie::build(Cookie::new(SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::hours(max_age_hours))
        .build()
}

/// Short-lived cookie carrying OAuth flow state between the redirect and the callback.
pub fn oauth_flow_cookie(name: &'static str, value: String, secure: bool) -> Cookie<'static> {
    Cookie::build(Cookie::new(name, value))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::minutes(OAUTH_FLOW_MINUTES))
        .build()
}

/// Removal cookie; the path must match the one the cookie was set with.
pub fn clear_cookie(name: &'static str) -> Cookie<'static> {
    Cookie::build(Cookie::new(name, "")).path("/").build()
}
