//! Migrations, default superuser and Google OAuth registration for a fresh deployment.

use std::process::ExitCode;

use clap::Parser;
use webapp_template::config::SetupConfig;
use webapp_template::{bootstrap, setup_logging};

#[derive(Parser, Debug)]
#[command(version, about = "Prepare the database of a production deployment")]
struct Cli {
    /// Overrides DATABASE_URL
    #[arg(long)]
    database_url: Option<String>,
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = SetupConfig::from_env()?;
    if let Some(url) = cli.database_url {
        config.database_url = url;
    }

    let mut conn = bootstrap::open_connection(&config.database_url)?;
    let oauth = bootstrap::setup_production(&mut conn, &config)?;

    println!("{oauth}");
    println!("Production setup completed successfully!");
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    setup_logging();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Error during setup: {:#}", e);
            eprintln!("Error during setup: {e:?}");
            ExitCode::FAILURE
        }
    }
}
