use std::env;

use webapp_template::app::{AppState, build_router};
use webapp_template::config::Config;
use webapp_template::db::connection::{create_pool, get_connection};
use webapp_template::{bootstrap, setup_logging};

const POOL_SIZE: u32 = 8;

// ----------------- Main -----------------

#[tokio::main]
async fn main() -> Result<(), lambda_http::Error> {
    // Initialize logging for all environments
    setup_logging();
    tracing::info!("Starting webapp-template...");

    let config = Config::from_env()?;
    let pool = create_pool(&config.database_url, POOL_SIZE)?;

    // En production, les migrations passent par `setup_production`
    if !config.is_production() {
        let mut conn = get_connection(&pool)?;
        bootstrap::run_migrations(&mut conn)?;
    }

    let addr = format!("{}:{}", config.server_host, config.server_port);
    let app = build_router(AppState::new(config, pool)?);

    if env::var("AWS_LAMBDA_FUNCTION_NAME").is_ok() {
        tracing::info!("Running in Lambda mode");
        lambda_http::run(app).await
    } else {
        tracing::info!("Running in local HTTP server mode");
        let listener = tokio::net::TcpListener::bind(&addr).await?;
        tracing::info!("🚀 Server running at http://{}", addr);
        axum::serve(listener, app).await?;

        Ok(())
    }
}
