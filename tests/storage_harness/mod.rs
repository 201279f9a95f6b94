//! Shared test harness for the marketplace
//!
//! Provides a small vehicle/home catalogue, a scripted in-process
//! [`SearchIndex`] that counts calls, a repository that always fails, and the
//! `repository_tests!` contract suite.
//!
//! # Usage
//!
//! From any integration test file in `tests/`:
//! ```rust,ignore
//! #[macro_use]
//! mod storage_harness;
//! use storage_harness::*;
//! ```

#![allow(dead_code)]

pub mod index;
pub mod repository_tests;

pub use index::ScriptedIndex;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use selj::core::category::{Category, FilterOption};
use selj::core::listing::{Listing, ListingStatus};
use selj::core::service::ListingRepository;

// ---------------------------------------------------------------------------
// Catalogue fixtures
// ---------------------------------------------------------------------------

pub fn categories() -> Vec<Category> {
    vec![
        Category::new("fordon", "Fordon")
            .with_create_fields(vec![
                FilterOption::select("Drivmedel", &["Bensin", "Diesel", "El"]).required(),
                FilterOption::range("Miltal", "0", "30000").required(),
            ])
            .with_search_filters(vec![
                FilterOption::select("Drivmedel", &["Bensin", "Diesel", "El"]),
                FilterOption::range("Miltal", "0", "30000"),
            ]),
        Category::new("bilar", "Bilar").with_parent("fordon"),
        Category::new("hem", "Hem")
            .with_legacy_filters(vec![FilterOption::chip("Skick", &["Ny", "Begagnad"])]),
    ]
}

/// Listing with a deterministic creation time; higher `minute` means newer
pub fn listing(id: &str, title: &str, minute: i64) -> Listing {
    let mut listing = Listing::new(id, title);
    listing.created_at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap() + Duration::minutes(minute);
    listing.price = "1 000 kr".to_string();
    listing
}

pub fn listings() -> Vec<Listing> {
    vec![
        listing("tesla", "Tesla Model 3", 3)
            .with_category("fordon")
            .with_county("Stockholm")
            .with_attribute("Drivmedel", "El")
            .with_attribute("Miltal", "4000"),
        listing("golf", "VW Golf", 2)
            .with_category("fordon")
            .with_county("Skåne")
            .with_attribute("Drivmedel", "Diesel")
            .with_attribute("Miltal", "21000"),
        listing("soffa", "Soffa i sammet", 1)
            .with_category("hem")
            .with_county("Stockholm")
            .with_attribute("Skick", "Ny"),
    ]
}

// ---------------------------------------------------------------------------
// Failing repository
// ---------------------------------------------------------------------------

/// Repository whose every call fails
pub struct BrokenRepository;

#[async_trait]
impl ListingRepository for BrokenRepository {
    async fn get_listings(&self) -> Result<Vec<Listing>> {
        anyhow::bail!("connection refused")
    }

    async fn get_categories(&self) -> Result<Vec<Category>> {
        anyhow::bail!("connection refused")
    }

    async fn create_listing(&self, _listing: Listing) -> Result<Listing> {
        anyhow::bail!("connection refused")
    }

    async fn update_listing_status(&self, _id: &str, _status: ListingStatus) -> Result<()> {
        anyhow::bail!("connection refused")
    }

    async fn create_category(&self, _category: Category) -> Result<Category> {
        anyhow::bail!("connection refused")
    }

    async fn update_category(&self, _value: &str, _category: Category) -> Result<Option<Category>> {
        anyhow::bail!("connection refused")
    }

    async fn delete_category(&self, _value: &str) -> Result<bool> {
        anyhow::bail!("connection refused")
    }

    fn backend_name(&self) -> &'static str {
        "broken"
    }
}
