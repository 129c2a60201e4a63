//! Helpers shared by the router tests.

use axum::Router;
use axum::body::to_bytes;
use axum::http::header;
use axum::response::Response;
use tempfile::TempDir;

use crate::app::{AppState, build_router};
use crate::config::Config;
use crate::db::connection::{get_connection, test_pool};
use crate::db::models::user::{NewUser, User};
use crate::db::repositories::user_repository::UserRepository;

pub fn test_app() -> (TempDir, AppState, Router) {
    test_app_with(|_| {})
}

/// Router over a fresh database, after `customize` has adjusted the config.
pub fn test_app_with(customize: impl FnOnce(&mut Config)) -> (TempDir, AppState, Router) {
    let (dir, pool) = test_pool();
    let mut config = Config::for_tests(&dir.path().join("test.sqlite3").to_string_lossy());
    customize(&mut config);

    let state = AppState::new(config, pool).expect("app state");
    let router = build_router(state.clone());
    (dir, state, router)
}

pub fn create_user(
    state: &AppState,
    username: &str,
    email: &str,
    password_hash: Option<String>,
) -> User {
    let mut conn = get_connection(&state.pool).expect("connection");
    UserRepository::create(
        &mut conn,
        &NewUser::regular(username.to_string(), email.to_string(), password_hash),
    )
    .expect("create user")
}

/// `Cookie` header value carrying a valid session for `user`.
pub fn session_cookie_for(state: &AppState, user: &User) -> String {
    let token = state.auth.issue_session(user).expect("session token");
    format!("sessionid={token}")
}

pub fn set_cookie_values(response: &Response) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .map(ToOwned::to_owned)
        .collect()
}

pub async fn body_text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    String::from_utf8(bytes.to_vec()).expect("utf-8 body")
}

pub async fn body_json(response: Response) -> serde_json::Value {
    serde_json::from_str(&body_text(response).await).expect("json body")
}
