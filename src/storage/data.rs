//! Listing and category collections shared by the in-process stores

use crate::core::category::Category;
use crate::core::listing::{Listing, ListingStatus};
use crate::core::validation::category::deletion_set;
use serde::{Deserialize, Serialize};

/// Everything a marketplace store holds
///
/// Listings are kept newest first. This is also the on-disk shape of the
/// file store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketData {
    #[serde(default)]
    pub listings: Vec<Listing>,
    #[serde(default)]
    pub categories: Vec<Category>,
}

impl MarketData {
    pub fn new(listings: Vec<Listing>, categories: Vec<Category>) -> Self {
        Self {
            listings,
            categories: categories.into_iter().map(Category::normalized).collect(),
        }
    }

    /// Put a listing first, replacing any listing with the same id
    pub fn insert_listing(&mut self, listing: Listing) {
        self.listings.retain(|l| l.id != listing.id);
        self.listings.insert(0, listing);
    }

    /// Returns whether the listing exists
    pub fn set_status(&mut self, id: &str, status: ListingStatus) -> bool {
        match self.listings.iter_mut().find(|l| l.id == id) {
            Some(listing) => {
                listing.status = status;
                true
            }
            None => false,
        }
    }

    /// Insert or replace by value
    pub fn upsert_category(&mut self, category: Category) -> Category {
        let category = category.normalized();
        match self.categories.iter_mut().find(|c| c.value == category.value) {
            Some(existing) => *existing = category.clone(),
            None => self.categories.push(category.clone()),
        }
        category
    }

    pub fn replace_category(&mut self, value: &str, category: Category) -> Option<Category> {
        let slot = self.categories.iter_mut().find(|c| c.value == value)?;
        *slot = category.normalized();
        Some(slot.clone())
    }

    /// Remove a category and its direct children
    pub fn delete_category(&mut self, value: &str) -> bool {
        let doomed = deletion_set(value, &self.categories);
        let before = self.categories.len();
        self.categories.retain(|c| !doomed.contains(&c.value));
        self.categories.len() != before
    }
}
