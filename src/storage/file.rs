//! JSON-file implementation of ListingRepository
//!
//! The whole catalogue lives in one pretty-printed JSON document
//! (`{ "listings": [...], "categories": [...] }`). It is read once when the
//! store is opened and rewritten after every write. A missing file is created
//! from the demo catalogue.

use crate::core::category::Category;
use crate::core::error::StorageError;
use crate::core::listing::{Listing, ListingStatus};
use crate::core::service::ListingRepository;
use crate::storage::data::MarketData;
use crate::storage::seed;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

/// File name used inside the data directory
pub const DATA_FILE: &str = "db.json";

#[derive(Clone)]
pub struct FileRepository {
    path: PathBuf,
    data: Arc<RwLock<MarketData>>,
}

impl FileRepository {
    /// Open `<dir>/db.json`, seeding it when it does not exist yet
    pub async fn open(dir: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_seed(dir, seed::demo_data()).await
    }

    /// Open `<dir>/db.json`, writing `seed` when it does not exist yet
    pub async fn open_with_seed(dir: impl AsRef<Path>, seed: MarketData) -> Result<Self> {
        let path = dir.as_ref().join(DATA_FILE);
        let data = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => {
                let parsed: MarketData = serde_json::from_str(&raw).map_err(|e| {
                    StorageError::IntegrityError {
                        message: format!("{}: {}", path.display(), e),
                    }
                })?;
                MarketData::new(parsed.listings, parsed.categories)
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "data file missing, writing demo catalogue");
                persist(&path, &seed).await?;
                seed
            }
            Err(err) => {
                return Err(err).with_context(|| format!("reading {}", path.display()));
            }
        };

        Ok(Self {
            path,
            data: Arc::new(RwLock::new(data)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Apply a mutation to a copy, write it to disk, then publish it
    ///
    /// The lock is held throughout; a failed write leaves the store unchanged.
    async fn write<T>(&self, mutate: impl FnOnce(&mut MarketData) -> T) -> Result<T> {
        let mut data = self.data.write().await;
        let mut next = data.clone();
        let out = mutate(&mut next);
        persist(&self.path, &next).await?;
        *data = next;
        Ok(out)
    }
}

async fn persist(path: &Path, data: &MarketData) -> Result<()> {
    if let Some(dir) = path.parent() {
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("creating {}", dir.display()))?;
    }
    let json = serde_json::to_string_pretty(data)?;
    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, json)
        .await
        .with_context(|| format!("writing {}", tmp.display()))?;
    tokio::fs::rename(&tmp, path)
        .await
        .with_context(|| format!("replacing {}", path.display()))?;
    Ok(())
}

#[async_trait]
impl ListingRepository for FileRepository {
    async fn get_listings(&self) -> Result<Vec<Listing>> {
        Ok(self.data.read().await.listings.clone())
    }

    async fn get_categories(&self) -> Result<Vec<Category>> {
        Ok(self.data.read().await.categories.clone())
    }

    async fn create_listing(&self, listing: Listing) -> Result<Listing> {
        let stored = listing.clone();
        self.write(move |data| data.insert_listing(stored)).await?;
        Ok(listing)
    }

    async fn update_listing_status(&self, id: &str, status: ListingStatus) -> Result<()> {
        self.write(|data| data.set_status(id, status)).await?;
        Ok(())
    }

    async fn create_category(&self, category: Category) -> Result<Category> {
        self.write(move |data| data.upsert_category(category)).await
    }

    async fn update_category(&self, value: &str, category: Category) -> Result<Option<Category>> {
        self.write(move |data| data.replace_category(value, category))
            .await
    }

    async fn delete_category(&self, value: &str) -> Result<bool> {
        self.write(|data| data.delete_category(value)).await
    }

    fn backend_name(&self) -> &'static str {
        "file"
    }
}
