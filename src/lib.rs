pub mod app;
pub mod catalog;
pub mod config;
pub mod explorer;

use std::sync::Arc;
use tracing::info;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Catalog error: {0}")]
    Catalog(#[from] catalog::CatalogError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub async fn run(config_path: &str, api_key: Option<&str>, debug_logs: bool) -> Result<(), AppError> {
    let config = config::Config::load(config_path, api_key)?;

    info!("Using config file: {}", config_path);
    info!("Catalog: {}", config.catalog.api_base_url);
    if debug_logs {
        info!("Debug logging enabled");
    }

    let client = catalog::TmdbClient::new(&config.catalog)?;
    let explorer = Arc::new(explorer::Explorer::new(Arc::new(client), config.catalog.clone()));

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    app::run_interactive(explorer, stdin, tokio::io::stdout()).await?;

    Ok(())
}
