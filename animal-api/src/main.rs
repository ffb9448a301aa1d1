use animal_api::config::AppConfig;
use animal_api::service::{AppState, build_router};

use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".to_string());
    let config = AppConfig::from_file(&config_path)?;

    // Initialize logging
    let _logging_guard =
        animal_api::logging::init_logging(&config.log_dir, "animal-api", &config.log_level);

    tracing::info!("Animal API starting...");

    // Load the immutable catalog and translation data; a malformed or
    // missing file aborts startup.
    let state = AppState::load(&config)?;
    let app = build_router(state, &config);

    tracing::info!("Starting web server at {}", config.server_address());
    let listener = tokio::net::TcpListener::bind(config.server_address()).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
