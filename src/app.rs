// src/app.rs

use axum::{Router, middleware, routing::get};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::auth::jwt::JwtManager;
use crate::auth::middleware::require_login;
use crate::auth::services::AuthService;
use crate::config::Config;
use crate::db::DbPool;
use crate::handlers::accounts::{
    google_callback, google_login, login_page, login_submit, logout, signup_page, signup_submit,
};
use crate::handlers::api::{api_example, api_protected_get, api_protected_post};
use crate::handlers::debug::debug_oauth;
use crate::handlers::health::health;
use crate::handlers::home::home;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub config: Arc<Config>,
    pub auth: Arc<AuthService>,
    /// Outbound client for the OAuth provider. Never follows redirects.
    pub http: reqwest::Client,
}

impl AppState {
    pub fn new(config: Config, pool: DbPool) -> anyhow::Result<Self> {
        let jwt_manager = JwtManager::new(&config.session_secret, config.session_expiration_hours);
        let http = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        Ok(Self {
            pool,
            config: Arc::new(config),
            auth: Arc::new(AuthService::new(jwt_manager)),
            http,
        })
    }
}

/// Configure les routes de comptes (login, signup, logout, Google)
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/login/", get(login_page).post(login_submit))
        .route("/signup/", get(signup_page).post(signup_submit))
        .route("/logout/", get(logout).post(logout))
        .route("/google/login/", get(google_login))
        .route("/google/login/callback/", get(google_callback))
}

/// Routes derrière le filtre d'authentification
pub fn protected_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/api/protected/",
            get(api_protected_get).post(api_protected_post),
        )
        .route_layer(middleware::from_fn_with_state(state, require_login))
}

/// Construit l'application complète
pub fn build_router(state: AppState) -> Router {
    let mut router = Router::new()
        .route("/", get(home))
        .route("/health", get(health))
        .route("/api/example/", get(api_example))
        .merge(protected_routes(state.clone()))
        .nest("/accounts", account_routes());

    if state.config.debug_routes {
        tracing::warn!("Debug routes enabled: /debug/oauth/ discloses partial OAuth secrets");
        router = router.route("/debug/oauth/", get(debug_oauth));
    }

    router
        // Middleware global de tracing
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use serde_json::{Value, json};
    use tower::ServiceExt; // for oneshot

    use crate::auth::password::PasswordManager;
    use crate::db::connection::get_connection;
    use crate::db::repositories::social_app_repository::SocialAppRepository;
    use crate::db::repositories::user_repository::UserRepository;
    use crate::test_support::{
        body_json, body_text, create_user, set_cookie_values, session_cookie_for, test_app,
        test_app_with,
    };

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post(uri: &str, body: impl Into<Body>) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .method("POST")
            .body(body.into())
            .unwrap()
    }

    fn post_form(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .method("POST")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_api_example_returns_sample_data() {
        let (_dir, _state, app) = test_app();

        let resp = app.oneshot(get("/api/example/")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers()[header::CONTENT_TYPE],
            "application/json"
        );

        let body = body_json(resp).await;
        assert_eq!(body["status"], "success");
        assert_eq!(body["message"], "This is an example API endpoint");
        assert_eq!(body["data"]["count"], 3);
        assert_eq!(body["data"]["items"], json!(["item1", "item2", "item3"]));
    }

    #[tokio::test]
    async fn test_api_example_rejects_post() {
        let (_dir, _state, app) = test_app();

        let resp = app.oneshot(post("/api/example/", "{}")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_protected_get_redirects_anonymous_user() {
        let (_dir, _state, app) = test_app();

        let resp = app.oneshot(get("/api/protected/")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(
            resp.headers()[header::LOCATION],
            "/accounts/login/?next=/api/protected/"
        );
    }

    #[tokio::test]
    async fn test_protected_post_redirects_anonymous_user() {
        let (_dir, _state, app) = test_app();

        let resp = app
            .oneshot(post("/api/protected/", r#"{"message":"Hello"}"#))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::FOUND);
    }

    #[tokio::test]
    async fn test_protected_rejects_forged_session() {
        let (_dir, _state, app) = test_app();

        let req = Request::builder()
            .uri("/api/protected/")
            .header(header::COOKIE, "sessionid=not-a-jwt")
            .body(Body::empty())
            .unwrap();

        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::FOUND);
    }

    #[tokio::test]
    async fn test_protected_get_returns_current_user() {
        let (_dir, state, app) = test_app();
        let user = create_user(&state, "testuser", "test@example.com", None);

        let req = Request::builder()
            .uri("/api/protected/")
            .header(header::COOKIE, session_cookie_for(&state, &user))
            .body(Body::empty())
            .unwrap();

        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let body = body_json(resp).await;
        assert_eq!(body["status"], "success");
        assert_eq!(body["message"], "You are authenticated!");
        assert_eq!(body["user"]["email"], "test@example.com");
        assert_eq!(body["user"]["id"], user.id);
    }

    #[tokio::test]
    async fn test_protected_accepts_bearer_token() {
        let (_dir, state, app) = test_app();
        let user = create_user(&state, "bearer", "bearer@example.com", None);
        let token = state.auth.issue_session(&user).unwrap();

        let req = Request::builder()
            .uri("/api/protected/")
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap();

        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_protected_post_echoes_json() {
        let (_dir, state, app) = test_app();
        let user = create_user(&state, "poster", "poster@example.com", None);

        let req = Request::builder()
            .uri("/api/protected/")
            .method("POST")
            .header(header::COOKIE, session_cookie_for(&state, &user))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"message":"Hello, API!","number":42}"#))
            .unwrap();

        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let body = body_json(resp).await;
        assert_eq!(body["status"], "success");
        assert_eq!(body["message"], "Data received successfully");
        assert_eq!(body["received"], json!({"message": "Hello, API!", "number": 42}));
    }

    #[tokio::test]
    async fn test_protected_post_rejects_invalid_json() {
        let (_dir, state, app) = test_app();
        let user = create_user(&state, "badjson", "badjson@example.com", None);

        // No JSON content type: the body is parsed anyway.
        let req = Request::builder()
            .uri("/api/protected/")
            .method("POST")
            .header(header::COOKIE, session_cookie_for(&state, &user))
            .body(Body::from("invalid json"))
            .unwrap();

        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body = body_json(resp).await;
        assert_eq!(body["status"], "error");
        assert_eq!(body["message"], "Invalid JSON data");
    }

    #[tokio::test]
    async fn test_protected_rejects_other_methods_when_authenticated() {
        let (_dir, state, app) = test_app();
        let user = create_user(&state, "putter", "putter@example.com", None);

        let req = Request::builder()
            .uri("/api/protected/")
            .method("PUT")
            .header(header::COOKIE, session_cookie_for(&state, &user))
            .body(Body::empty())
            .unwrap();

        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_inactive_user_is_treated_as_anonymous() {
        let (_dir, state, app) = test_app();
        let user = create_user(&state, "sleepy", "sleepy@example.com", None);
        {
            use crate::db::schema::users;
            use diesel::prelude::*;
            let mut conn = get_connection(&state.pool).unwrap();
            diesel::update(users::table.find(user.id))
                .set(users::is_active.eq(false))
                .execute(&mut conn)
                .unwrap();
        }

        let req = Request::builder()
            .uri("/api/protected/")
            .header(header::COOKIE, session_cookie_for(&state, &user))
            .body(Body::empty())
            .unwrap();

        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::FOUND);
    }

    #[tokio::test]
    async fn test_health() {
        let (_dir, _state, app) = test_app();

        let resp = app.oneshot(get("/health")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await, json!({"status": "ok"}));
    }

    #[tokio::test]
    async fn test_home_for_anonymous_visitor() {
        let (_dir, _state, app) = test_app();

        let resp = app.oneshot(get("/")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let html = body_text(resp).await;
        assert!(html.contains("Welcome to Your Web App Template"));
        assert!(html.contains("Login"));
        assert!(html.contains("Sign Up"));
    }

    #[tokio::test]
    async fn test_home_for_signed_in_user() {
        let (_dir, state, app) = test_app();
        let user = create_user(&state, "homer", "homer@example.com", None);

        let req = Request::builder()
            .uri("/")
            .header(header::COOKIE, session_cookie_for(&state, &user))
            .body(Body::empty())
            .unwrap();

        let html = body_text(app.oneshot(req).await.unwrap()).await;
        assert!(html.contains("homer@example.com"));
        assert!(html.contains("Logout"));
    }

    #[tokio::test]
    async fn test_debug_oauth_reports_site_and_request() {
        let (_dir, _state, app) = test_app();

        let req = Request::builder()
            .uri("/debug/oauth/?foo=bar")
            .header(header::HOST, "localhost:3000")
            .header("X-Custom", "yes")
            .body(Body::empty())
            .unwrap();

        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let body = body_json(resp).await;
        assert_eq!(body["site_domain"], "example.com");
        assert_eq!(body["site_name"], "example.com");
        assert_eq!(
            body["callback_url"],
            "http://example.com/accounts/google/login/callback/"
        );
        assert_eq!(body["request_path"], "/debug/oauth/");
        assert_eq!(body["request_host"], "localhost:3000");
        assert_eq!(body["query_params"], json!({"foo": "bar"}));
        assert_eq!(body["headers"]["x-custom"], "yes");
        assert_eq!(body["social_apps"], json!([]));
    }

    #[tokio::test]
    async fn test_debug_oauth_lists_truncated_apps() {
        let (_dir, state, app) = test_app();
        {
            let mut conn = get_connection(&state.pool).unwrap();
            let (google, _) = SocialAppRepository::upsert_credentials(
                &mut conn,
                "google",
                "Google",
                "abcdefghijklmnop",
                "0123456789",
            )
            .unwrap();
            SocialAppRepository::add_site(&mut conn, google.id, 1).unwrap();
        }

        let body = body_json(app.oneshot(get("/debug/oauth/")).await.unwrap()).await;
        let apps = body["social_apps"].as_array().unwrap();
        assert_eq!(apps.len(), 1);
        assert_eq!(apps[0]["client_id_prefix"], "abcdefghij");
        assert_eq!(apps[0]["secret_prefix"], "01234");
        assert_eq!(apps[0]["sites"], json!(["example.com"]));
    }

    #[tokio::test]
    async fn test_debug_oauth_hidden_when_disabled() {
        let (_dir, _state, app) = test_app_with(|config| config.debug_routes = false);

        let resp = app.oneshot(get("/debug/oauth/")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_debug_oauth_missing_site_is_404() {
        let (_dir, _state, app) = test_app_with(|config| config.site_id = 99);

        let resp = app.oneshot(get("/debug/oauth/")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_login_page_renders_form() {
        let (_dir, _state, app) = test_app();

        let resp = app
            .oneshot(get("/accounts/login/?next=/api/protected/"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let html = body_text(resp).await;
        assert!(html.contains("name=\"login\""));
        assert!(html.contains("value=\"/api/protected/\""));
    }

    #[tokio::test]
    async fn test_login_sets_session_cookie_and_redirects_to_next() {
        let (_dir, state, app) = test_app();
        let hash = PasswordManager::hash("Secret123!").unwrap();
        create_user(&state, "alice", "alice@example.com", Some(hash));

        let resp = app
            .clone()
            .oneshot(post_form(
                "/accounts/login/",
                "login=alice%40example.com&password=Secret123%21&next=%2Fapi%2Fprotected%2F",
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(resp.headers()[header::LOCATION], "/api/protected/");

        let cookies = set_cookie_values(&resp);
        let session = cookies
            .iter()
            .find(|c| c.starts_with("sessionid="))
            .expect("session cookie");
        assert!(session.contains("HttpOnly"));

        // The new session opens the protected API.
        let cookie = session.split(';').next().unwrap().to_string();
        let req = Request::builder()
            .uri("/api/protected/")
            .header(header::COOKIE, cookie)
            .body(Body::empty())
            .unwrap();
        let body = body_json(app.oneshot(req).await.unwrap()).await;
        assert_eq!(body["user"]["email"], "alice@example.com");
    }

    #[tokio::test]
    async fn test_login_with_wrong_password_rerenders_form() {
        let (_dir, state, app) = test_app();
        let hash = PasswordManager::hash("Secret123!").unwrap();
        create_user(&state, "bob", "bob@example.com", Some(hash));

        let resp = app
            .oneshot(post_form("/accounts/login/", "login=bob&password=nope"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert!(set_cookie_values(&resp).is_empty());

        let html = body_text(resp).await;
        assert!(html.contains("not correct"));
        assert!(html.contains("value=\"bob\""));
    }

    #[tokio::test]
    async fn test_login_ignores_external_next() {
        let (_dir, state, app) = test_app();
        let hash = PasswordManager::hash("Secret123!").unwrap();
        create_user(&state, "carol", "carol@example.com", Some(hash));

        let resp = app
            .oneshot(post_form(
                "/accounts/login/",
                "login=carol&password=Secret123%21&next=https%3A%2F%2Fevil.example.com%2F",
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(resp.headers()[header::LOCATION], "/");
    }

    #[tokio::test]
    async fn test_signup_creates_account_and_signs_in() {
        let (_dir, state, app) = test_app();

        let resp = app
            .oneshot(post_form(
                "/accounts/signup/",
                "username=dave&email=dave%40example.com&password1=Secret123%21&password2=Secret123%21",
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(resp.headers()[header::LOCATION], "/");
        assert!(
            set_cookie_values(&resp)
                .iter()
                .any(|c| c.starts_with("sessionid="))
        );

        let mut conn = get_connection(&state.pool).unwrap();
        let user = UserRepository::find_by_email(&mut conn, "dave@example.com")
            .unwrap()
            .unwrap();
        assert_eq!(user.username, "dave");
        assert!(!user.is_superuser);
    }

    #[tokio::test]
    async fn test_signup_rejects_duplicate_email() {
        let (_dir, state, app) = test_app();
        create_user(&state, "erin", "erin@example.com", None);

        let resp = app
            .oneshot(post_form(
                "/accounts/signup/",
                "username=erin2&email=erin%40example.com&password1=Secret123%21&password2=Secret123%21",
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CONFLICT);
        assert!(set_cookie_values(&resp).is_empty());

        let html = body_text(resp).await;
        assert!(html.contains("already registered"));
    }

    #[tokio::test]
    async fn test_logout_clears_session_cookie() {
        let (_dir, state, app) = test_app();
        let user = create_user(&state, "frank", "frank@example.com", None);

        let req = Request::builder()
            .uri("/accounts/logout/")
            .method("POST")
            .header(header::COOKIE, session_cookie_for(&state, &user))
            .body(Body::empty())
            .unwrap();

        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(resp.headers()[header::LOCATION], "/");

        let cookies = set_cookie_values(&resp);
        let removal = cookies
            .iter()
            .find(|c| c.starts_with("sessionid="))
            .expect("removal cookie");
        assert!(removal.starts_with("sessionid=;"));
    }

    #[tokio::test]
    async fn test_google_login_requires_configured_app() {
        let (_dir, _state, app) = test_app();

        let resp = app.oneshot(get("/accounts/google/login/")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let body = body_json(resp).await;
        assert_eq!(body["error"], "OAUTH_NOT_CONFIGURED");
    }

    #[tokio::test]
    async fn test_google_login_redirects_to_consent_page() {
        let (_dir, state, app) = test_app();
        {
            let mut conn = get_connection(&state.pool).unwrap();
            crate::bootstrap::add_google_oauth(&mut conn, 1, "client-id", "client-secret").unwrap();
        }

        let req = Request::builder()
            .uri("/accounts/google/login/?next=/api/protected/")
            .header(header::HOST, "localhost:3000")
            .body(Body::empty())
            .unwrap();

        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::FOUND);

        let location = resp.headers()[header::LOCATION].to_str().unwrap();
        assert!(location.starts_with("https://accounts.google.com/o/oauth2/v2/auth?"));
        assert!(location.contains("client_id=client-id"));
        assert!(location.contains(
            "redirect_uri=http%3A%2F%2Flocalhost%3A3000%2Faccounts%2Fgoogle%2Flogin%2Fcallback%2F"
        ));

        let cookies = set_cookie_values(&resp);
        for name in ["oauth_state=", "oauth_pkce=", "oauth_next="] {
            assert!(cookies.iter().any(|c| c.starts_with(name)), "missing {name}");
        }
    }

    #[tokio::test]
    async fn test_google_callback_rejects_state_mismatch() {
        let (_dir, _state, app) = test_app();

        let req = Request::builder()
            .uri("/accounts/google/login/callback/?code=abc&state=forged")
            .header(header::COOKIE, "oauth_state=expected; oauth_pkce=verifier")
            .body(Body::empty())
            .unwrap();

        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert!(
            set_cookie_values(&resp)
                .iter()
                .any(|c| c.starts_with("oauth_state=;"))
        );

        let body: Value = body_json(resp).await;
        assert_eq!(body["error"], "OAUTH_FAILED");
    }

    #[tokio::test]
    async fn test_google_callback_reports_provider_error() {
        let (_dir, _state, app) = test_app();

        let resp = app
            .oneshot(get("/accounts/google/login/callback/?error=access_denied"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
