pub mod accounts;
pub mod api;
pub mod debug;
pub mod health;
pub mod home;

use axum::http::{HeaderMap, Uri, header};

/// Host the client addressed, as Django's `request.get_host()` reports it.
pub(crate) fn request_host(headers: &HeaderMap, uri: &Uri) -> String {
    headers
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .map(ToOwned::to_owned)
        .or_else(|| uri.authority().map(ToString::to_string))
        .unwrap_or_default()
}
