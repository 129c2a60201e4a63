//! One-shot setup routines behind the command-line tools.
//!
//! All of them can be re-run safely: existing rows are reused or updated,
//! never duplicated.

use std::fmt;

use anyhow::Context;
use diesel::SqliteConnection;

use crate::auth::oauth::GOOGLE_PROVIDER;
use crate::auth::services::AuthService;
use crate::config::SetupConfig;
use crate::db::DbConnection;
use crate::db::connection;
use crate::db::models::site::Site;
use crate::db::models::social_app::SocialApp;
use crate::db::repositories::site_repository::SiteRepository;
use crate::db::repositories::social_app_repository::SocialAppRepository;
use crate::db::repositories::user_repository::UserRepository;

pub const DEFAULT_ADMIN_USERNAME: &str = "admin";
pub const DEFAULT_ADMIN_EMAIL: &str = "admin@example.com";
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin123";

const SETUP_APP_NAME: &str = "Google OAuth";
const ADD_APP_NAME: &str = "Google";

/// Secrets this short are never partially shown.
const MASK_MIN_LEN: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuperuserOutcome {
    Created,
    AlreadyExists,
}

impl fmt::Display for SuperuserOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created => write!(
                f,
                "Superuser created: {DEFAULT_ADMIN_USERNAME}/{DEFAULT_ADMIN_PASSWORD}"
            ),
            Self::AlreadyExists => f.write_str("Superuser already exists"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created,
    Updated,
}

#[derive(Debug, Clone)]
pub struct OAuthSetup {
    pub app: SocialApp,
    pub site: Site,
    pub outcome: UpsertOutcome,
}

impl fmt::Display for OAuthSetup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.outcome {
            UpsertOutcome::Created => writeln!(f, "Google OAuth app created (ID: {})", self.app.id)?,
            UpsertOutcome::Updated => writeln!(f, "Google OAuth app updated (ID: {})", self.app.id)?,
        }
        write!(f, "Google OAuth configured for site: {}", self.site.domain)
    }
}

/// Single connection for a command-line run.
pub fn open_connection(database_url: &str) -> anyhow::Result<DbConnection> {
    let pool = connection::create_pool(database_url, 1)?;
    let conn = connection::get_connection(&pool)
        .with_context(|| format!("Cannot open database {database_url}"))?;
    Ok(conn)
}

/// Applies pending schema migrations; returns the applied versions.
pub fn run_migrations(conn: &mut SqliteConnection) -> anyhow::Result<Vec<String>> {
    let applied = connection::run_migrations(conn)?;

    if applied.is_empty() {
        tracing::info!("Database schema is up to date");
    } else {
        tracing::info!(count = applied.len(), "Applied migrations: {}", applied.join(", "));
    }
    Ok(applied)
}

/// Creates the default admin account unless some superuser already exists.
pub fn ensure_superuser(conn: &mut SqliteConnection) -> anyhow::Result<SuperuserOutcome> {
    if UserRepository::superuser_exists(conn)? {
        tracing::info!("Superuser already exists");
        return Ok(SuperuserOutcome::AlreadyExists);
    }

    let user = AuthService::create_superuser(
        conn,
        DEFAULT_ADMIN_USERNAME,
        DEFAULT_ADMIN_EMAIL,
        DEFAULT_ADMIN_PASSWORD,
    )
    .context("Failed to create the default superuser")?;

    tracing::warn!(user_id = user.id, "Default superuser created, change its password");
    Ok(SuperuserOutcome::Created)
}

/// Registers the Google app for the production domain with the
/// credentials from the environment (empty when unset).
pub fn setup_google_oauth(conn: &mut SqliteConnection, config: &SetupConfig) -> anyhow::Result<OAuthSetup> {
    let (site, site_created) = SiteRepository::get_or_create(
        conn,
        &config.production_site_domain,
        &config.production_site_name,
    )?;
    if site_created {
        tracing::info!(domain = %site.domain, "Site created");
    }

    if config.google_client_id.is_empty() || config.google_client_secret.is_empty() {
        tracing::warn!("GOOGLE_CLIENT_ID or GOOGLE_CLIENT_SECRET is empty, Google login will fail");
    }

    link_google_app(
        conn,
        site,
        SETUP_APP_NAME,
        &config.google_client_id,
        &config.google_client_secret,
    )
}

/// Stores the given Google credentials and enables them on the current site.
pub fn add_google_oauth(
    conn: &mut SqliteConnection,
    site_id: i32,
    client_id: &str,
    client_secret: &str,
) -> anyhow::Result<OAuthSetup> {
    let site = SiteRepository::get_current(conn, site_id)
        .with_context(|| format!("Current site (SITE_ID={site_id}) is missing"))?;

    link_google_app(conn, site, ADD_APP_NAME, client_id, client_secret)
}

fn link_google_app(
    conn: &mut SqliteConnection,
    site: Site,
    name: &str,
    client_id: &str,
    client_secret: &str,
) -> anyhow::Result<OAuthSetup> {
    let (app, created) =
        SocialAppRepository::upsert_credentials(conn, GOOGLE_PROVIDER, name, client_id, client_secret)?;
    SocialAppRepository::add_site(conn, app.id, site.id)?;

    let outcome = if created {
        UpsertOutcome::Created
    } else {
        UpsertOutcome::Updated
    };
    tracing::info!(app_id = app.id, site = %site.domain, ?outcome, "Google OAuth configured");

    Ok(OAuthSetup { app, site, outcome })
}

/// `first5...last5`; short secrets are hidden completely.
pub fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= MASK_MIN_LEN {
        return "*".repeat(chars.len());
    }

    let head: String = chars[..5].iter().collect();
    let tail: String = chars[chars.len() - 5..].iter().collect();
    format!("{head}...{tail}")
}

/// Migrations, default superuser and Google OAuth, in that order.
/// Stops at the first failure.
pub fn setup_production(conn: &mut SqliteConnection, config: &SetupConfig) -> anyhow::Result<OAuthSetup> {
    tracing::info!("Running database migrations...");
    run_migrations(conn).context("Migration step failed")?;

    let superuser = ensure_superuser(conn).context("Superuser step failed")?;
    tracing::info!("{superuser}");

    let oauth = setup_google_oauth(conn, config).context("Google OAuth step failed")?;
    tracing::info!("Production setup completed successfully!");
    Ok(oauth)
}
