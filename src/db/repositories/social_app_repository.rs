use crate::db::error::RepositoryError;
use crate::db::models::site::Site;
use crate::db::models::social_app::{NewSocialApp, SocialApp, SocialAppSite};
use crate::db::schema::{social_app_sites, social_apps, sites};
use diesel::prelude::*;

pub struct SocialAppRepository;

impl SocialAppRepository {
    pub fn find_by_provider(
        conn: &mut SqliteConnection,
        provider: &str,
    ) -> Result<Option<SocialApp>, RepositoryError> {
        social_apps::table
            .filter(social_apps::provider.eq(provider))
            .select(SocialApp::as_select())
            .first(conn)
            .optional()
            .map_err(Into::into)
    }

    /// The provider's app, only if it is enabled for the given site.
    pub fn find_for_site(
        conn: &mut SqliteConnection,
        provider: &str,
        site_id: i32,
    ) -> Result<Option<SocialApp>, RepositoryError> {
        social_apps::table
            .inner_join(social_app_sites::table)
            .filter(social_apps::provider.eq(provider))
            .filter(social_app_sites::site_id.eq(site_id))
            .select(SocialApp::as_select())
            .first(conn)
            .optional()
            .map_err(Into::into)
    }

    pub fn list_all(conn: &mut SqliteConnection) -> Result<Vec<SocialApp>, RepositoryError> {
        social_apps::table
            .order(social_apps::id)
            .select(SocialApp::as_select())
            .load(conn)
            .map_err(Into::into)
    }

    pub fn create(
        conn: &mut SqliteConnection,
        new_app: &NewSocialApp<'_>,
    ) -> Result<SocialApp, RepositoryError> {
        diesel::insert_into(social_apps::table)
            .values(new_app)
            .returning(SocialApp::as_returning())
            .get_result(conn)
            .map_err(Into::into)
    }

    pub fn update_credentials(
        conn: &mut SqliteConnection,
        id: i32,
        client_id: &str,
        secret: &str,
    ) -> Result<SocialApp, RepositoryError> {
        diesel::update(social_apps::table.find(id))
            .set((
                social_apps::client_id.eq(client_id),
                social_apps::secret.eq(secret),
            ))
            .returning(SocialApp::as_returning())
            .get_result(conn)
            .map_err(Into::into)
    }

    /// Creates the provider's app or overwrites the credentials of the existing one.
    /// `name` only applies on creation. The flag is `true` when a row was inserted.
    pub fn upsert_credentials(
        conn: &mut SqliteConnection,
        provider: &str,
        name: &str,
        client_id: &str,
        secret: &str,
    ) -> Result<(SocialApp, bool), RepositoryError> {
        conn.transaction::<_, RepositoryError, _>(|conn| match Self::find_by_provider(conn, provider)? {
            Some(app) => {
                let app = Self::update_credentials(conn, app.id, client_id, secret)?;
                Ok((app, false))
            }
            None => {
                let app = Self::create(
                    conn,
                    &NewSocialApp {
                        provider,
                        name,
                        client_id,
                        secret,
                    },
                )?;
                Ok((app, true))
            }
        })
    }

    /// Enables the app on a site. Adding an existing link is a no-op.
    pub fn add_site(
        conn: &mut SqliteConnection,
        social_app_id: i32,
        site_id: i32,
    ) -> Result<(), RepositoryError> {
        diesel::insert_or_ignore_into(social_app_sites::table)
            .values(SocialAppSite {
                social_app_id,
                site_id,
            })
            .execute(conn)?;

        Ok(())
    }

    pub fn sites_for(
        conn: &mut SqliteConnection,
        social_app_id: i32,
    ) -> Result<Vec<Site>, RepositoryError> {
        social_app_sites::table
            .inner_join(sites::table)
            .filter(social_app_sites::social_app_id.eq(social_app_id))
            .order(sites::id)
            .select(Site::as_select())
            .load(conn)
            .map_err(Into::into)
    }
}
