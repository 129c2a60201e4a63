use axum::body::Bytes;
use webapp_template_api::{
    ApiStatus, EchoResponse, ExampleResponse, ProtectedUserResponse, UserSummary,
};

use crate::auth::extractors::CurrentUser;
use crate::error::AppError;
use crate::response::AppResponse;

/// GET /api/example/
/// Public endpoint returning fixed sample data
pub async fn api_example() -> AppResponse<ExampleResponse> {
    AppResponse::ok(ExampleResponse::sample())
}

/// GET /api/protected/
/// Profil de l'utilisateur connecté
pub async fn api_protected_get(
    CurrentUser(user): CurrentUser,
) -> AppResponse<ProtectedUserResponse> {
    AppResponse::ok(ProtectedUserResponse {
        status: ApiStatus::Success,
        message: "You are authenticated!".to_string(),
        user: UserSummary::from(&user),
    })
}

/// POST /api/protected/
/// Echoes the posted JSON. The body is parsed whatever its content type.
pub async fn api_protected_post(
    CurrentUser(user): CurrentUser,
    body: Bytes,
) -> Result<AppResponse<EchoResponse>, AppError> {
    let received: serde_json::Value = serde_json::from_slice(&body)?;
    tracing::debug!(user_id = user.id, "Protected API received data");

    Ok(AppResponse::ok(EchoResponse {
        status: ApiStatus::Success,
        message: "Data received successfully".to_string(),
        received,
    }))
}
