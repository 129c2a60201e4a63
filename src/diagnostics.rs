//! OAuth configuration report, shared by `/debug/oauth/` and the `debug_oauth` command.

use std::fmt;

use diesel::SqliteConnection;
use webapp_template_api::SocialAppSummary;

use crate::auth::oauth::{GOOGLE_AUTH_URL, GOOGLE_PROVIDER, GOOGLE_SCOPES, callback_url};
use crate::db::error::RepositoryError;
use crate::db::models::site::Site;
use crate::db::repositories::site_repository::SiteRepository;
use crate::db::repositories::social_app_repository::SocialAppRepository;

const CLIENT_ID_PREFIX_LEN: usize = 10;
const SECRET_PREFIX_LEN: usize = 5;

/// First `len` characters of `value`.
pub fn truncate_prefix(value: &str, len: usize) -> String {
    value.chars().take(len).collect()
}

/// Every registered app with its credentials cut down to a short prefix.
pub fn social_app_summaries(
    conn: &mut SqliteConnection,
) -> Result<Vec<SocialAppSummary>, RepositoryError> {
    SocialAppRepository::list_all(conn)?
        .into_iter()
        .map(|app| {
            let sites = SocialAppRepository::sites_for(conn, app.id)?
                .into_iter()
                .map(|site| site.domain)
                .collect();

            Ok::<_, RepositoryError>(SocialAppSummary {
                id: app.id,
                client_id_prefix: truncate_prefix(&app.client_id, CLIENT_ID_PREFIX_LEN),
                secret_prefix: truncate_prefix(&app.secret, SECRET_PREFIX_LEN),
                provider: app.provider,
                name: app.name,
                sites,
            })
        })
        .collect()
}

#[derive(Debug)]
pub struct OAuthReport {
    pub site_id: i32,
    /// `None` when the configured site id has no row.
    pub current_site: Option<Site>,
    pub sites: Vec<Site>,
    pub social_apps: Vec<SocialAppSummary>,
}

pub fn oauth_report(
    conn: &mut SqliteConnection,
    site_id: i32,
) -> Result<OAuthReport, RepositoryError> {
    Ok(OAuthReport {
        site_id,
        current_site: SiteRepository::find_by_id(conn, site_id)?,
        sites: SiteRepository::list_all(conn)?,
        social_apps: social_app_summaries(conn)?,
    })
}

impl fmt::Display for OAuthReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.current_site {
            Some(site) => writeln!(
                f,
                "Current site: id={}, domain={}, name={}",
                site.id, site.domain, site.name
            )?,
            None => writeln!(f, "No site configured!")?,
        }

        writeln!(f, "\nAll sites:")?;
        for site in &self.sites {
            writeln!(f, "- id={}, domain={}, name={}", site.id, site.domain, site.name)?;
        }

        writeln!(f, "\nSocial apps:")?;
        for app in &self.social_apps {
            writeln!(f, "- id={}, provider={}, name={}", app.id, app.provider, app.name)?;
            writeln!(f, "  client_id={}...", app.client_id_prefix)?;
            writeln!(f, "  secret={}...", app.secret_prefix)?;
            writeln!(f, "  sites: {}", app.sites.join(", "))?;
        }

        writeln!(f, "\nExpected callback URLs:")?;
        for site in &self.sites {
            writeln!(f, "- For site {}: {}", site.domain, callback_url(&site.domain))?;
        }

        writeln!(f, "\nSettings:")?;
        writeln!(f, "- SITE_ID: {}", self.site_id)?;
        write!(
            f,
            "- {}: scopes={}, auth_url={}",
            GOOGLE_PROVIDER,
            GOOGLE_SCOPES.join(" "),
            GOOGLE_AUTH_URL
        )
    }
}
