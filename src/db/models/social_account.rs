use crate::db::schema::social_accounts;
use chrono::NaiveDateTime;
use diesel::{Insertable, Queryable, Selectable};

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = social_accounts)]
pub struct NewSocialAccount<'a> {
    pub user_id: i32,
    pub provider: &'a str,
    pub uid: &'a str,
    pub email: Option<&'a str>,
}

// All fields are required for Diesel Queryable deserialization (schema alignment).
#[allow(dead_code)]
#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = social_accounts)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct SocialAccount {
    pub id: i32,
    pub user_id: i32,
    pub provider: String,
    pub uid: String,
    pub email: Option<String>,
    pub date_joined: NaiveDateTime,
}
