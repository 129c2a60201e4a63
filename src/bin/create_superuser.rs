//! Creates the default `admin` superuser unless a superuser already exists.

use clap::Parser;
use webapp_template::config::SetupConfig;
use webapp_template::{bootstrap, setup_logging};

#[derive(Parser, Debug)]
#[command(version, about = "Create the default superuser if none exists")]
struct Cli {
    /// Overrides DATABASE_URL
    #[arg(long)]
    database_url: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    setup_logging();

    let config = SetupConfig::from_env()?;
    let database_url = cli.database_url.unwrap_or(config.database_url);

    let mut conn = bootstrap::open_connection(&database_url)?;
    let outcome = bootstrap::ensure_superuser(&mut conn)?;
    println!("{outcome}");

    Ok(())
}
