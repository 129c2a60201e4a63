use crate::db::error::RepositoryError;
use crate::db::models::site::{NewSite, Site};
use crate::db::schema::sites;
use diesel::prelude::*;

pub struct SiteRepository;

impl SiteRepository {
    pub fn find_by_id(conn: &mut SqliteConnection, id: i32) -> Result<Option<Site>, RepositoryError> {
        sites::table
            .find(id)
            .select(Site::as_select())
            .first(conn)
            .optional()
            .map_err(Into::into)
    }

    /// The site configured through `SITE_ID`.
    pub fn get_current(conn: &mut SqliteConnection, site_id: i32) -> Result<Site, RepositoryError> {
        Self::find_by_id(conn, site_id)?
            .ok_or_else(|| RepositoryError::NotFound(format!("Site {site_id} is not configured")))
    }

    pub fn find_by_domain(
        conn: &mut SqliteConnection,
        domain: &str,
    ) -> Result<Option<Site>, RepositoryError> {
        sites::table
            .filter(sites::domain.eq(domain))
            .select(Site::as_select())
            .first(conn)
            .optional()
            .map_err(Into::into)
    }

    pub fn list_all(conn: &mut SqliteConnection) -> Result<Vec<Site>, RepositoryError> {
        sites::table
            .order(sites::id)
            .select(Site::as_select())
            .load(conn)
            .map_err(Into::into)
    }

    /// Looks the site up by domain; `name` is only used when it has to be created.
    /// The flag is `true` when a new row was inserted.
    pub fn get_or_create(
        conn: &mut SqliteConnection,
        domain: &str,
        name: &str,
    ) -> Result<(Site, bool), RepositoryError> {
        conn.transaction::<_, RepositoryError, _>(|conn| {
            if let Some(site) = Self::find_by_domain(conn, domain)? {
                return Ok((site, false));
            }

            let site = diesel::insert_into(sites::table)
                .values(NewSite { domain, name })
                .returning(Site::as_returning())
                .get_result(conn)?;

            Ok((site, true))
        })
    }
}
