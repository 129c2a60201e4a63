use crate::db::schema::sites;
use diesel::{Identifiable, Insertable, Queryable, Selectable};

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = sites)]
pub struct NewSite<'a> {
    pub domain: &'a str,
    pub name: &'a str,
}

/// A deployment domain. The current site is the one whose id matches `SITE_ID`.
#[derive(Queryable, Selectable, Identifiable, Debug, Clone, PartialEq, Eq)]
#[diesel(table_name = sites)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Site {
    pub id: i32,
    pub domain: String,
    pub name: String,
}
