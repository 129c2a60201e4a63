use crate::db::schema::{social_app_sites, social_apps};
use diesel::{Identifiable, Insertable, Queryable, Selectable};

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = social_apps)]
pub struct NewSocialApp<'a> {
    pub provider: &'a str,
    pub name: &'a str,
    pub client_id: &'a str,
    pub secret: &'a str,
}

/// OAuth client credentials registered for one identity provider.
#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = social_apps)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct SocialApp {
    pub id: i32,
    pub provider: String,
    pub name: String,
    pub client_id: String,
    pub secret: String,
}

#[derive(Insertable, Debug, Clone, Copy)]
#[diesel(table_name = social_app_sites)]
pub struct SocialAppSite {
    pub social_app_id: i32,
    pub site_id: i32,
}
