use std::fmt;

use crate::db::schema::users;
use chrono::NaiveDateTime;
use diesel::{Identifiable, Insertable, Queryable, Selectable};
use webapp_template_api::UserSummary;

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = users)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: Option<String>,
    pub is_superuser: bool,
    pub is_staff: bool,
}

impl NewUser {
    /// Regular account, no elevated flags.
    pub fn regular(username: String, email: String, password_hash: Option<String>) -> Self {
        Self {
            username,
            email,
            password_hash,
            is_superuser: false,
            is_staff: false,
        }
    }
}

#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct User {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub password_hash: Option<String>,
    pub is_superuser: bool,
    pub is_staff: bool,
    pub is_active: bool,
    pub date_joined: NaiveDateTime,
    pub last_login: Option<NaiveDateTime>,
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.email)
    }
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        UserSummary {
            email: user.email.clone(),
            id: user.id,
        }
    }
}
