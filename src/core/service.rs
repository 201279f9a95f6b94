//! Service traits for the listing repository and the external search index

use crate::core::category::Category;
use crate::core::listing::{Listing, ListingStatus};
use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Primary store for listings and categories
///
/// Implementations own their own synchronization. The search core only ever
/// reads an unordered snapshot and never re-fetches during a single search.
#[async_trait]
pub trait ListingRepository: Send + Sync {
    /// Snapshot of all listings, in store order
    async fn get_listings(&self) -> Result<Vec<Listing>>;

    /// Snapshot of all categories
    async fn get_categories(&self) -> Result<Vec<Category>>;

    /// Insert a listing (replaces an existing one with the same id)
    async fn create_listing(&self, listing: Listing) -> Result<Listing>;

    /// Change the moderation status of a listing
    ///
    /// Unknown ids are not an error.
    async fn update_listing_status(&self, id: &str, status: ListingStatus) -> Result<()>;

    /// Insert or replace a category by value
    async fn create_category(&self, category: Category) -> Result<Category>;

    /// Replace the category stored under `value`
    ///
    /// Returns `None` when no such category exists.
    async fn update_category(&self, value: &str, category: Category) -> Result<Option<Category>>;

    /// Delete a category and its direct children
    ///
    /// Returns whether anything was removed.
    async fn delete_category(&self, value: &str) -> Result<bool>;

    /// Short backend name for logs and status output
    fn backend_name(&self) -> &'static str;
}

/// Structural filter clauses the external index evaluates itself
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexFilter {
    pub category: Option<String>,
    pub county: Option<String>,
    pub status: Option<String>,
}

impl IndexFilter {
    pub fn is_empty(&self) -> bool {
        self.category.is_none() && self.county.is_none() && self.status.is_none()
    }
}

/// Query sent to the external index
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexQuery {
    /// Free text matched against title, meta and description; `None` matches all
    pub text: Option<String>,
    pub filter: IndexFilter,
}

/// Raw answer of the external index
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexResponse {
    /// Stored documents, not yet decoded into listings
    pub hits: Vec<serde_json::Value>,
    pub found: u64,
}

/// External full-text/faceted index
///
/// The index is a secondary, eventually-consistent view of the repository.
/// `upsert` and `bulk_upsert` are idempotent and last-write-wins per id.
#[async_trait]
pub trait SearchIndex: Send + Sync {
    async fn upsert(&self, listing: &Listing) -> Result<()>;

    async fn bulk_upsert(&self, listings: &[Listing]) -> Result<()>;

    async fn remove(&self, id: &str) -> Result<()>;

    async fn update_status(&self, id: &str, status: ListingStatus) -> Result<()>;

    async fn query(&self, query: &IndexQuery) -> Result<IndexResponse>;

    /// Short provider name for logs and status output
    fn provider_name(&self) -> &'static str;
}
