//! Account pages: form login, signup, logout and Google sign-in.

use axum::{
    Form,
    extract::{Query, State},
    http::{HeaderMap, Uri},
    response::{Html, IntoResponse, Response},
};
use axum_extra::extract::CookieJar;
use webapp_template_api::{LoginForm, NextQuery, OAuthCallbackQuery, SignupForm};

use super::request_host;
use crate::app::AppState;
use crate::auth::extractors::{
    MaybeUser, OAUTH_NEXT_COOKIE, OAUTH_PKCE_COOKIE, OAUTH_STATE_COOKIE, SESSION_COOKIE,
    clear_cookie, oauth_flow_cookie, safe_next, session_cookie,
};
use crate::auth::oauth::{
    self, GOOGLE_PROVIDER, GoogleClient, OAuthError, authorization_request, build_client,
    redirect_url,
};
use crate::auth::services::{AuthService, SocialIdentity};
use crate::db::connection::get_connection;
use crate::db::models::user::User;
use crate::db::repositories::site_repository::SiteRepository;
use crate::db::repositories::social_app_repository::SocialAppRepository;
use crate::error::AppError;
use crate::pages;
use crate::response::found;

/// Adds the session cookie for `user` and sends the browser on to `next`.
fn sign_in(state: &AppState, jar: CookieJar, user: &User, next: &str) -> Result<Response, AppError> {
    let token = state.auth.issue_session(user)?;
    let cookie = session_cookie(
        token,
        state.config.is_production(),
        state.auth.jwt_manager().expiration_hours(),
    );

    tracing::info!(user_id = user.id, "User signed in");
    Ok((jar.add(cookie), found(next)).into_response())
}

/// GET /accounts/login/
pub async fn login_page(
    MaybeUser(user): MaybeUser,
    Query(query): Query<NextQuery>,
) -> Response {
    if user.is_some() {
        return found(safe_next(query.next.as_deref()));
    }

    Html(pages::login_form(query.next.as_deref(), "", None)).into_response()
}

/// POST /accounts/login/
/// Connexion par formulaire
pub async fn login_submit(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let mut conn = get_connection(&state.pool)?;

    match AuthService::authenticate(&mut conn, form.login.trim(), &form.password) {
        Ok(user) => sign_in(&state, jar, &user, safe_next(form.next.as_deref())),
        Err(err) if err.is_form_error() => {
            tracing::debug!(error = %err, "Login rejected");
            let page = pages::login_form(
                form.next.as_deref(),
                &form.login,
                Some(&err.public_message()),
            );
            Ok((err.status_code(), Html(page)).into_response())
        }
        Err(err) => Err(err),
    }
}

/// GET /accounts/signup/
pub async fn signup_page(
    MaybeUser(user): MaybeUser,
    Query(query): Query<NextQuery>,
) -> Response {
    if user.is_some() {
        return found(safe_next(query.next.as_deref()));
    }

    Html(pages::signup_form(query.next.as_deref(), "", "", None)).into_response()
}

/// POST /accounts/signup/
/// Inscription puis connexion immédiate
pub async fn signup_submit(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<SignupForm>,
) -> Result<Response, AppError> {
    let mut conn = get_connection(&state.pool)?;

    match AuthService::signup(&mut conn, &form) {
        Ok(user) => sign_in(&state, jar, &user, safe_next(form.next.as_deref())),
        Err(err) if err.is_form_error() => {
            tracing::debug!(error = %err, "Signup rejected");
            let page = pages::signup_form(
                form.next.as_deref(),
                &form.username,
                &form.email,
                Some(&err.public_message()),
            );
            Ok((err.status_code(), Html(page)).into_response())
        }
        Err(err) => Err(err),
    }
}

/// GET|POST /accounts/logout/
pub async fn logout(jar: CookieJar) -> (CookieJar, Response) {
    (jar.remove(clear_cookie(SESSION_COOKIE)), found("/"))
}

fn redirect_scheme(state: &AppState) -> &'static str {
    if state.config.is_production() {
        "https"
    } else {
        "http"
    }
}

/// Google client configured for the current site, redirecting to this host.
fn google_client(state: &AppState, host: &str) -> Result<GoogleClient, AppError> {
    let mut conn = get_connection(&state.pool)?;
    let site = SiteRepository::get_current(&mut conn, state.config.site_id)?;
    let app = SocialAppRepository::find_for_site(&mut conn, GOOGLE_PROVIDER, site.id)?
        .ok_or_else(|| {
            AppError::OAuthNotConfigured(format!(
                "No Google application is enabled for site {}",
                site.domain
            ))
        })?;

    let host = if host.is_empty() { site.domain.as_str() } else { host };
    build_client(&app, &redirect_url(redirect_scheme(state), host)).map_err(AppError::from)
}

/// GET /accounts/google/login/
/// Redirects to Google's consent page
pub async fn google_login(
    State(state): State<AppState>,
    jar: CookieJar,
    uri: Uri,
    headers: HeaderMap,
    Query(query): Query<NextQuery>,
) -> Result<Response, AppError> {
    let client = google_client(&state, &request_host(&headers, &uri))?;
    let request = authorization_request(&client);

    let secure = state.config.is_production();
    let jar = jar
        .add(oauth_flow_cookie(OAUTH_STATE_COOKIE, request.csrf_state, secure))
        .add(oauth_flow_cookie(OAUTH_PKCE_COOKIE, request.pkce_verifier, secure))
        .add(oauth_flow_cookie(
            OAUTH_NEXT_COOKIE,
            safe_next(query.next.as_deref()).to_string(),
            secure,
        ));

    tracing::info!("Dispatching Google OAuth redirect");
    Ok((jar, found(request.url.as_str())).into_response())
}

/// GET /accounts/google/login/callback/
/// Exchanges the code, signs the user in and clears the flow cookies.
pub async fn google_callback(
    State(state): State<AppState>,
    jar: CookieJar,
    uri: Uri,
    headers: HeaderMap,
    Query(query): Query<OAuthCallbackQuery>,
) -> Response {
    let cookie_value = |name| jar.get(name).map(|c| c.value().to_owned());
    let expected_state = cookie_value(OAUTH_STATE_COOKIE);
    let pkce_verifier = cookie_value(OAUTH_PKCE_COOKIE);
    let next = cookie_value(OAUTH_NEXT_COOKIE);

    let jar = jar
        .remove(clear_cookie(OAUTH_STATE_COOKIE))
        .remove(clear_cookie(OAUTH_PKCE_COOKIE))
        .remove(clear_cookie(OAUTH_NEXT_COOKIE));

    let result = complete_google_login(
        &state,
        &request_host(&headers, &uri),
        query,
        expected_state,
        pkce_verifier,
    )
    .await;

    match result.and_then(|user| sign_in(&state, jar.clone(), &user, safe_next(next.as_deref()))) {
        Ok(response) => response,
        Err(err) => {
            tracing::warn!(error = %err, "Google sign-in failed");
            (jar, err).into_response()
        }
    }
}

async fn complete_google_login(
    state: &AppState,
    host: &str,
    query: OAuthCallbackQuery,
    expected_state: Option<String>,
    pkce_verifier: Option<String>,
) -> Result<User, AppError> {
    if let Some(error) = query.error {
        return Err(OAuthError::ProviderDenied(error).into());
    }

    oauth::verify_state(expected_state.as_deref(), query.state.as_deref())?;
    let code = query.code.ok_or(OAuthError::MissingParameter("code"))?;
    let pkce_verifier = pkce_verifier.ok_or(OAuthError::MissingParameter("code_verifier"))?;

    let client = google_client(state, host)?;
    let access_token = oauth::exchange_code(&client, &state.http, code, pkce_verifier).await?;
    let profile = oauth::fetch_profile(&state.http, &access_token).await?;

    let mut conn = get_connection(&state.pool)?;
    AuthService::sign_in_social(
        &mut conn,
        &SocialIdentity {
            provider: GOOGLE_PROVIDER,
            uid: &profile.sub,
            email: profile.email.as_deref(),
            email_verified: profile.email_verified,
        },
    )
}
