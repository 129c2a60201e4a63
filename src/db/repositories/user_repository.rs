use crate::db::error::RepositoryError;
use crate::db::models::user::{NewUser, User};
use crate::db::schema::users;
use diesel::prelude::*;

pub struct UserRepository;

impl UserRepository {
    /// Case-insensitive: the email column collates `NOCASE`.
    pub fn find_by_email(
        conn: &mut SqliteConnection,
        email: &str,
    ) -> Result<Option<User>, RepositoryError> {
        users::table
            .filter(users::email.eq(email))
            .select(User::as_select())
            .first(conn)
            .optional()
            .map_err(Into::into)
    }

    pub fn find_by_username(
        conn: &mut SqliteConnection,
        username: &str,
    ) -> Result<Option<User>, RepositoryError> {
        users::table
            .filter(users::username.eq(username))
            .select(User::as_select())
            .first(conn)
            .optional()
            .map_err(Into::into)
    }

    /// Matches either the username or the email address.
    pub fn find_by_login(
        conn: &mut SqliteConnection,
        login: &str,
    ) -> Result<Option<User>, RepositoryError> {
        users::table
            .filter(users::username.eq(login).or(users::email.eq(login)))
            .select(User::as_select())
            .first(conn)
            .optional()
            .map_err(Into::into)
    }

    pub fn find_by_id(conn: &mut SqliteConnection, id: i32) -> Result<Option<User>, RepositoryError> {
        users::table
            .find(id)
            .select(User::as_select())
            .first(conn)
            .optional()
            .map_err(Into::into)
    }

    /// Fails with `UniqueViolation` when the email or username is taken.
    pub fn create(conn: &mut SqliteConnection, new_user: &NewUser) -> Result<User, RepositoryError> {
        diesel::insert_into(users::table)
            .values(new_user)
            .returning(User::as_returning())
            .get_result(conn)
            .map_err(Into::into)
    }

    pub fn update_last_login(conn: &mut SqliteConnection, id: i32) -> Result<(), RepositoryError> {
        diesel::update(users::table.find(id))
            .set(users::last_login.eq(Some(chrono::Utc::now().naive_utc())))
            .execute(conn)?;

        Ok(())
    }

    pub fn superuser_exists(conn: &mut SqliteConnection) -> Result<bool, RepositoryError> {
        diesel::select(diesel::dsl::exists(
            users::table.filter(users::is_superuser.eq(true)),
        ))
        .get_result(conn)
        .map_err(Into::into)
    }
}
