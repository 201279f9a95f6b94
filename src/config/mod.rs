//! Configuration loading and management
//!
//! Settings come from an optional YAML file and are then overridden by
//! environment variables:
//!
//! | Variable              | Field                      |
//! |-----------------------|----------------------------|
//! | `HOST`, `PORT`        | `server.host`, `server.port` |
//! | `STORE_BACKEND`       | `store.backend` (memory, file, postgres) |
//! | `DATA_DIR`            | `store.data_dir`           |
//! | `DATABASE_URL`        | `store.database_url`       |
//! | `PG_POOL_SIZE`        | `store.pool_size`          |
//! | `SEARCH_PROVIDER`     | `search.provider` (local, typesense) |
//! | `TYPESENSE_HOST`, `TYPESENSE_API_KEY`, `TYPESENSE_COLLECTION` | `search.typesense.*` |
//!
//! Setting `DATABASE_URL` without `STORE_BACKEND` selects PostgreSQL.

use crate::core::error::ConfigError;
use crate::core::service::{ListingRepository, SearchIndex};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

/// Which listing repository to open
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Memory,
    #[default]
    File,
    Postgres,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "memory" => Ok(StoreBackend::Memory),
            "file" => Ok(StoreBackend::File),
            "postgres" | "postgresql" => Ok(StoreBackend::Postgres),
            other => Err(format!("unknown store backend '{}'", other)),
        }
    }
}

impl fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StoreBackend::Memory => "memory",
            StoreBackend::File => "file",
            StoreBackend::Postgres => "postgres",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    /// Directory holding `db.json` for the file backend
    pub data_dir: PathBuf,
    pub database_url: Option<String>,
    pub pool_size: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            data_dir: PathBuf::from("data"),
            database_url: None,
            pool_size: 10,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchProvider {
    #[default]
    Local,
    Typesense,
}

impl FromStr for SearchProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "local" | "file" => Ok(SearchProvider::Local),
            "typesense" => Ok(SearchProvider::Typesense),
            other => Err(format!("unknown search provider '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypesenseConfig {
    pub host: Option<String>,
    pub api_key: Option<String>,
    pub collection: String,
}

impl Default for TypesenseConfig {
    fn default() -> Self {
        Self {
            host: None,
            api_key: None,
            collection: "listings".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub provider: SearchProvider,
    pub typesense: TypesenseConfig,
}

impl SearchConfig {
    /// The external index is only used when selected and fully configured
    pub fn use_typesense(&self) -> bool {
        self.provider == SearchProvider::Typesense
            && self.typesense.host.as_deref().is_some_and(|h| !h.is_empty())
            && self.typesense.api_key.as_deref().is_some_and(|k| !k.is_empty())
    }
}

/// Complete application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub search: SearchConfig,
}

fn invalid(field: &str, value: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        message: message.into(),
    }
}

impl AppConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ConfigError::FileNotFound {
                path: path.to_string(),
            },
            _ => ConfigError::IoError {
                message: e.to_string(),
            },
        })?;
        let config: Self = serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError {
            file: Some(path.to_string()),
            message: e.to_string(),
        })?;
        Ok(config)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Defaults overridden by the process environment
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        Ok(config)
    }

    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from any key lookup; empty values are ignored
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(host) = get("HOST") {
            self.server.host = host;
        }
        if let Some(port) = get("PORT") {
            self.server.port = port
                .trim()
                .parse()
                .map_err(|_| invalid("PORT", &port, "must be a port number"))?;
        }

        if let Some(url) = get("DATABASE_URL") {
            self.store.database_url = Some(url);
            self.store.backend = StoreBackend::Postgres;
        }
        if let Some(backend) = get("STORE_BACKEND") {
            self.store.backend = backend
                .parse()
                .map_err(|e: String| invalid("STORE_BACKEND", &backend, e))?;
        }
        if let Some(dir) = get("DATA_DIR") {
            self.store.data_dir = PathBuf::from(dir);
        }
        if let Some(size) = get("PG_POOL_SIZE") {
            self.store.pool_size = size
                .trim()
                .parse()
                .map_err(|_| invalid("PG_POOL_SIZE", &size, "must be a positive integer"))?;
        }

        if let Some(provider) = get("SEARCH_PROVIDER") {
            self.search.provider = provider
                .parse()
                .map_err(|e: String| invalid("SEARCH_PROVIDER", &provider, e))?;
        }
        if let Some(host) = get("TYPESENSE_HOST") {
            self.search.typesense.host = Some(host);
        }
        if let Some(key) = get("TYPESENSE_API_KEY") {
            self.search.typesense.api_key = Some(key);
        }
        if let Some(collection) = get("TYPESENSE_COLLECTION") {
            self.search.typesense.collection = collection;
        }

        self.validate()
    }

    pub fn validate(&self) -> Result<()> {
        if self.store.pool_size == 0 {
            return Err(invalid("store.pool_size", "0", "must be at least 1").into());
        }
        if self.store.backend == StoreBackend::Postgres && self.store.database_url.is_none() {
            return Err(invalid("store.database_url", "", "required by the postgres backend").into());
        }
        if self.search.provider == SearchProvider::Typesense && !self.search.use_typesense() {
            tracing::warn!("typesense selected without host and api key, using local search");
        }
        Ok(())
    }

    /// `host:port` for the listener
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Open the configured listing repository
    pub async fn open_repository(&self) -> Result<Arc<dyn ListingRepository>> {
        match self.store.backend {
            StoreBackend::Memory => Ok(Arc::new(crate::storage::InMemoryRepository::seeded())),
            StoreBackend::File => self.open_file_repository().await,
            StoreBackend::Postgres => self.open_postgres_repository().await,
        }
    }

    #[cfg(feature = "file")]
    async fn open_file_repository(&self) -> Result<Arc<dyn ListingRepository>> {
        let repo = crate::storage::FileRepository::open(&self.store.data_dir).await?;
        Ok(Arc::new(repo))
    }

    #[cfg(not(feature = "file"))]
    async fn open_file_repository(&self) -> Result<Arc<dyn ListingRepository>> {
        Err(invalid("store.backend", "file", "built without the `file` feature").into())
    }

    #[cfg(feature = "postgres")]
    async fn open_postgres_repository(&self) -> Result<Arc<dyn ListingRepository>> {
        let url = self
            .store
            .database_url
            .as_deref()
            .ok_or_else(|| invalid("store.database_url", "", "required by the postgres backend"))?;
        let repo = crate::storage::PostgresRepository::connect(url, self.store.pool_size).await?;
        Ok(Arc::new(repo))
    }

    #[cfg(not(feature = "postgres"))]
    async fn open_postgres_repository(&self) -> Result<Arc<dyn ListingRepository>> {
        Err(invalid("store.backend", "postgres", "built without the `postgres` feature").into())
    }

    /// Build the external index, if one is configured
    pub async fn open_search_index(&self) -> Result<Option<Arc<dyn SearchIndex>>> {
        if !self.search.use_typesense() {
            return Ok(None);
        }
        self.open_typesense().await
    }

    #[cfg(feature = "typesense")]
    async fn open_typesense(&self) -> Result<Option<Arc<dyn SearchIndex>>> {
        let ts = &self.search.typesense;
        let index = crate::storage::TypesenseIndex::new(
            ts.host.clone().unwrap_or_default(),
            ts.api_key.clone().unwrap_or_default(),
            ts.collection.clone(),
        )?;
        if let Err(err) = index.ensure_collection().await {
            tracing::warn!(error = %err, "could not prepare search collection");
        }
        Ok(Some(Arc::new(index)))
    }

    #[cfg(not(feature = "typesense"))]
    async fn open_typesense(&self) -> Result<Option<Arc<dyn SearchIndex>>> {
        tracing::warn!("built without the `typesense` feature, using local search");
        Ok(None)
    }
}
