//! Prints the OAuth configuration stored in the database.

use clap::Parser;
use webapp_template::config::SetupConfig;
use webapp_template::diagnostics::oauth_report;
use webapp_template::{bootstrap, setup_logging};

#[derive(Parser, Debug)]
#[command(version, about = "Print sites, social apps and expected OAuth callback URLs")]
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
    let report = oauth_report(&mut conn, config.site_id)?;
    println!("{report}");

    Ok(())
}
