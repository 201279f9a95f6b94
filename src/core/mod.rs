//! Core module containing the marketplace model, schema helpers and service traits

pub mod category;
pub mod error;
pub mod listing;
pub mod query;
pub mod schema;
pub mod service;
pub mod validation;

pub use category::{Category, ChipUi, FilterOption, RangeUi, SelectUi};
pub use error::{SeljError, SeljResult};
pub use listing::{Attributes, Listing, ListingStatus, SellerKind};
pub use query::{SearchParams, SearchRequest, SearchResult};
pub use schema::{FieldKind, fields_for_category, search_labels};
pub use service::{IndexFilter, IndexQuery, IndexResponse, ListingRepository, SearchIndex};
