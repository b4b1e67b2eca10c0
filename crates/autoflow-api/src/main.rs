//! # autoflow-api: Binary Entry Point
//!
//! Starts the Axum HTTP server. Binds to `PORT` (default 8080).

use autoflow_api::state::{AppConfig, AppState};
use autoflow_github::{GitHubClient, GitHubConfig};

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let json = std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json"));

    if json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let config = AppConfig::from_env();
    tracing::debug!(?config, "configuration loaded");
    if config.auth_token.is_none() {
        tracing::warn!("AUTH_TOKEN not set, authentication is disabled");
    }

    // Database is optional; absent means in-memory only.
    let db_pool = autoflow_api::db::init_pool().await.map_err(|e| {
        tracing::error!("Database initialization failed: {e}");
        e
    })?;

    let github = match GitHubConfig::from_env() {
        Ok(github_config) => {
            tracing::info!(owner = %github_config.owner, "GitHub publishing configured");
            match GitHubClient::new(github_config) {
                Ok(client) => Some(client),
                Err(e) => {
                    tracing::error!("Failed to create GitHub client: {e}");
                    return Err(e.into());
                }
            }
        }
        Err(e) => {
            tracing::warn!("GitHub publishing not configured: {e}. /v1/push will return 503.");
            None
        }
    };

    let port = config.port;
    let state = AppState::try_with_config(config, github, db_pool).map_err(|e| {
        tracing::error!("Failed to load tutorial catalog: {e}");
        e
    })?;

    state.hydrate_from_db().await.map_err(|e| {
        tracing::error!("Database hydration failed: {e}");
        e
    })?;

    let app = autoflow_api::app(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("AutoFlow Learn API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
