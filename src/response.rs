use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// JSON body with a status code.
pub struct AppResponse<T> {
    status: StatusCode,
    data: T,
}

impl<T> AppResponse<T>
where
    T: Serialize,
{
    /// 200 OK with data
    pub fn ok(data: T) -> Self {
        Self {
            status: StatusCode::OK,
            data,
        }
    }
}

impl<T> IntoResponse for AppResponse<T>
where
    T: Serialize,
{
    fn into_response(self) -> Response {
        (self.status, Json(self.data)).into_response()
    }
}

/// 302 Found, the redirect Django-style views answer with.
pub fn found(location: &str) -> Response {
    match HeaderValue::from_str(location) {
        Ok(value) => (StatusCode::FOUND, [(header::LOCATION, value)]).into_response(),
        Err(_) => {
            tracing::warn!(location, "Refusing to redirect to an invalid location");
            (StatusCode::FOUND, [(header::LOCATION, HeaderValue::from_static("/"))]).into_response()
        }
    }
}
