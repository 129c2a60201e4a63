use axum::response::Html;

use crate::auth::extractors::MaybeUser;
use crate::pages;

/// GET /
pub async fn home(MaybeUser(user): MaybeUser) -> Html<String> {
    Html(pages::home(user.as_ref()))
}
