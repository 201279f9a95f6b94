//! # selj
//!
//! Backend core of a classifieds marketplace: listings, admin-defined
//! categories with dynamic attribute schemas, and faceted search.
//!
//! ## Features
//!
//! - **Per-category schemas**: select, chip and range fields, separately for
//!   the publish form and the search filters
//! - **Faceted matching**: category, county, free text and attribute filters
//!   (equality and numeric `-min`/`-max` bounds)
//! - **Self-healing index**: an optional external index is reconciled when it
//!   comes back empty and bypassed when it fails
//! - **Pluggable storage**: in-memory, JSON file or PostgreSQL
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use selj::prelude::*;
//!
//! let repository = Arc::new(InMemoryRepository::seeded());
//! let search = SearchService::new(repository);
//!
//! let request = SearchRequest::new()
//!     .category("fordon")
//!     .filter("Drivmedel", "Hybrid")
//!     .filter("Miltal-max", "10000");
//! let result = search.search(&request).await?;
//! ```

pub mod config;
pub mod core;
pub mod market;
pub mod search;
pub mod server;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Model ===
    pub use crate::core::{
        Attributes, Category, FieldKind, FilterOption, Listing, ListingStatus, RangeUi,
        SearchParams, SearchRequest, SearchResult, SellerKind, fields_for_category, search_labels,
    };

    // === Errors ===
    pub use crate::core::error::{SeljError, SeljResult};

    // === Service traits ===
    pub use crate::core::service::{
        IndexFilter, IndexQuery, IndexResponse, ListingRepository, SearchIndex,
    };

    // === Validation ===
    pub use crate::core::validation::{normalize_filters, validate_attributes};

    // === Search ===
    pub use crate::search::{
        SearchGate, SearchOutcome, SearchPath, SearchService, match_listings, post_filter,
    };

    // === Marketplace ===
    pub use crate::market::{CategoryInput, ListingDraft, Marketplace, StatusUpdate};

    // === Storage ===
    #[cfg(feature = "file")]
    pub use crate::storage::FileRepository;
    pub use crate::storage::InMemoryRepository;
    #[cfg(feature = "postgres")]
    pub use crate::storage::PostgresRepository;
    #[cfg(feature = "typesense")]
    pub use crate::storage::TypesenseIndex;

    // === Config ===
    pub use crate::config::AppConfig;

    // === Server ===
    pub use crate::server::{AppState, ServerBuilder};

    // === External dependencies ===
    pub use anyhow::Result;
    pub use async_trait::async_trait;
    pub use std::sync::Arc;
    pub use tokio_util::sync::CancellationToken;
}
