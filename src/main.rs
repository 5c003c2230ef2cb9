use std::net::SocketAddr;
use std::sync::Arc;

use dotenvy::dotenv;
use sqlx::sqlite::SqlitePoolOptions;
use tracing::{error, info, warn};

use twogether::config::AppConfig;
use twogether::database::{ProfileRepository, SqliteProfileRepository};
use twogether::services::profile_list_service::ProfileListController;
use twogether::web;

#[tokio::main]
async fn main() {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    if let Err(e) = run(AppConfig::from_env()).await {
        error!("twogether stopped: {}", e);
        std::process::exit(1);
    }
}

async fn run(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    info!(database_url = %config.database_url, "connecting to database");
    let pool = SqlitePoolOptions::new()
        .connect(&config.database_url)
        .await?;
    let repo: Arc<dyn ProfileRepository> =
        Arc::new(SqliteProfileRepository::connect(pool).await?);

    let controller = match config.current_profile_id.clone() {
        Some(profile_id) => ProfileListController::with_current_profile_id(repo, profile_id),
        None => ProfileListController::new(repo),
    };
    let _subscription = controller.start();
    if controller.current_profile_id().is_some() && !controller.load_primary_categories().await {
        warn!("primary categories for the configured profile could not be loaded");
    }

    let app = web::router(controller);

    // Fall back to the next port when the configured one is taken.
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            let fallback: SocketAddr = format!("{}:{}", config.host, config.port.saturating_add(1)).parse()?;
            warn!("Could not bind {}: {}. Trying {}", addr, e, fallback);
            tokio::net::TcpListener::bind(fallback).await?
        }
    };

    info!("listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
