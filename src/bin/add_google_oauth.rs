//! Stores Google OAuth credentials and enables them on the current site.

use clap::Parser;
use webapp_template::config::SetupConfig;
use webapp_template::{bootstrap, setup_logging};

#[derive(Parser, Debug)]
#[command(version, about = "Add Google OAuth credentials to the database")]
struct Cli {
    client_id: String,
    client_secret: String,

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
    let setup =
        bootstrap::add_google_oauth(&mut conn, config.site_id, &cli.client_id, &cli.client_secret)?;

    match setup.outcome {
        bootstrap::UpsertOutcome::Created => println!("Created new Google OAuth app"),
        bootstrap::UpsertOutcome::Updated => {
            println!("Updated existing Google OAuth app (ID: {})", setup.app.id);
        }
    }
    println!(
        "Successfully added Google OAuth credentials for site: {}",
        setup.site.domain
    );
    println!("Client ID: {}", cli.client_id);
    println!(
        "Client Secret: {} (masked for security)",
        bootstrap::mask_secret(&cli.client_secret)
    );

    Ok(())
}
