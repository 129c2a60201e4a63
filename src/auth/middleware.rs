//! Authentication filter
//!
//! Placed in front of routes that require a signed-in account.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use super::extractors::{CurrentUser, login_redirect, resolve_user};
use crate::app::AppState;
use crate::error::AppError;

/// Middleware to require login
///
/// Anonymous requests are redirected (302) to the login page with a `next`
/// parameter, whatever their method. Otherwise the account is added to the
/// request extensions as [`CurrentUser`].
///
/// # Usage
/// ```ignore
/// let protected_routes = Router::new()
///     .route("/api/protected/", get(..).post(..))
///     .route_layer(middleware::from_fn_with_state(state, require_login));
/// ```
pub async fn require_login(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(user) = resolve_user(&state, request.headers())? else {
        tracing::debug!(path = %request.uri().path(), "Anonymous request, redirecting to login");
        return Err(login_redirect(&state.config.login_url, request.uri()));
    };

    request.extensions_mut().insert(CurrentUser(user));

    Ok(next.run(request).await)
}
