use super::{DbConnection, DbPool};
use crate::db::error::RepositoryError;
use anyhow::anyhow;
use diesel::SqliteConnection;
use diesel::connection::SimpleConnection;
use diesel::r2d2::{ConnectionManager, CustomizeConnection};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Per-connection settings SQLite does not persist in the database file.
#[derive(Debug, Clone, Copy)]
struct SqlitePragmas;

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for SqlitePragmas {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), diesel::r2d2::Error> {
        conn.batch_execute("PRAGMA foreign_keys = ON; PRAGMA busy_timeout = 5000;")
            .map_err(diesel::r2d2::Error::QueryError)
    }
}

/// Accepts a bare file path as well as `sqlite://path` / `sqlite:path`.
fn sqlite_path(database_url: &str) -> &str {
    database_url
        .strip_prefix("sqlite://")
        .or_else(|| database_url.strip_prefix("sqlite:"))
        .unwrap_or(database_url)
}

pub fn create_pool(database_url: &str, max_size: u32) -> anyhow::Result<DbPool> {
    let manager = ConnectionManager::<SqliteConnection>::new(sqlite_path(database_url));

    diesel::r2d2::Pool::builder()
        .max_size(max_size)
        .connection_customizer(Box::new(SqlitePragmas))
        .build(manager)
        .map_err(|e| anyhow!("Failed to create pool: {}", e))
}

pub fn get_connection(pool: &DbPool) -> Result<DbConnection, RepositoryError> {
    pool.get().map_err(Into::into)
}

/// Applies every embedded migration not yet recorded in the database.
/// Returns the versions that were applied.
pub fn run_migrations(conn: &mut SqliteConnection) -> anyhow::Result<Vec<String>> {
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| anyhow!("Failed to run migrations: {}", e))?;

    Ok(applied.iter().map(ToString::to_string).collect())
}

/// Fresh migrated database in a temporary directory.
/// Keep the returned `TempDir` alive for as long as the pool is used.
#[cfg(test)]
pub fn test_pool() -> (tempfile::TempDir, DbPool) {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("test.sqlite3");
    let pool = create_pool(path.to_str().expect("utf-8 path"), 4).expect("pool");

    let mut conn = get_connection(&pool).expect("connection");
    run_migrations(&mut conn).expect("migrations");

    (dir, pool)
}
