//! selj marketplace server
//!
//! Usage: `selj [config.yaml]`. Environment variables (and a `.env` file)
//! override the file; see [`selj::config`].

use anyhow::{Context, Result};
use selj::config::AppConfig;
use selj::server::ServerBuilder;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (development)
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "selj=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();

    let mut config = match std::env::args().nth(1) {
        Some(path) => AppConfig::from_yaml_file(&path)
            .with_context(|| format!("loading configuration from {}", path))?,
        None => AppConfig::default(),
    };
    config.apply_env()?;

    tracing::info!(
        store = %config.store.backend,
        search = ?config.search.provider,
        "starting selj"
    );

    let repository = config
        .open_repository()
        .await
        .context("opening listing repository")?;

    let mut builder = ServerBuilder::new().with_shared_repository(repository);
    if let Some(index) = config.open_search_index().await? {
        builder = builder.with_search_index(index);
    }

    builder.serve(&config.bind_address()).await
}
