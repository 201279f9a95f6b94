//! In-memory implementation of ListingRepository for testing and development

use crate::core::category::Category;
use crate::core::listing::{Listing, ListingStatus};
use crate::core::service::ListingRepository;
use crate::storage::data::MarketData;
use crate::storage::seed;
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory repository
///
/// Clones share the same data.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    data: Arc<RwLock<MarketData>>,
}

impl InMemoryRepository {
    /// Create an empty repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a repository holding the given data
    pub fn with_data(listings: Vec<Listing>, categories: Vec<Category>) -> Self {
        Self {
            data: Arc::new(RwLock::new(MarketData::new(listings, categories))),
        }
    }

    /// Create a repository holding the demo catalogue
    pub fn seeded() -> Self {
        Self {
            data: Arc::new(RwLock::new(seed::demo_data())),
        }
    }
}

#[async_trait]
impl ListingRepository for InMemoryRepository {
    async fn get_listings(&self) -> Result<Vec<Listing>> {
        Ok(self.data.read().await.listings.clone())
    }

    async fn get_categories(&self) -> Result<Vec<Category>> {
        Ok(self.data.read().await.categories.clone())
    }

    async fn create_listing(&self, listing: Listing) -> Result<Listing> {
        self.data.write().await.insert_listing(listing.clone());
        Ok(listing)
    }

    async fn update_listing_status(&self, id: &str, status: ListingStatus) -> Result<()> {
        self.data.write().await.set_status(id, status);
        Ok(())
    }

    async fn create_category(&self, category: Category) -> Result<Category> {
        Ok(self.data.write().await.upsert_category(category))
    }

    async fn update_category(&self, value: &str, category: Category) -> Result<Option<Category>> {
        Ok(self.data.write().await.replace_category(value, category))
    }

    async fn delete_category(&self, value: &str) -> Result<bool> {
        Ok(self.data.write().await.delete_category(value))
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
