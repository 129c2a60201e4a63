use std::collections::BTreeMap;

use axum::{
    extract::{Query, State},
    http::{HeaderMap, Uri},
};
use webapp_template_api::DebugOAuthResponse;

use super::request_host;
use crate::app::AppState;
use crate::auth::oauth::callback_url;
use crate::db::connection::get_connection;
use crate::db::repositories::site_repository::SiteRepository;
use crate::diagnostics::social_app_summaries;
use crate::error::AppError;
use crate::response::AppResponse;

/// GET /debug/oauth/
/// Current site, registered social apps and what the server saw of the request.
pub async fn debug_oauth(
    State(state): State<AppState>,
    uri: Uri,
    headers: HeaderMap,
    Query(query_params): Query<BTreeMap<String, String>>,
) -> Result<AppResponse<DebugOAuthResponse>, AppError> {
    let mut conn = get_connection(&state.pool)?;
    let site = SiteRepository::get_current(&mut conn, state.config.site_id)?;
    let social_apps = social_app_summaries(&mut conn)?;

    let header_map = headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect();

    Ok(AppResponse::ok(DebugOAuthResponse {
        callback_url: callback_url(&site.domain),
        site_domain: site.domain,
        site_name: site.name,
        request_path: uri.path().to_string(),
        request_host: request_host(&headers, &uri),
        query_params,
        headers: header_map,
        social_apps,
    }))
}
