//! Validation of submitted listings and admin category payloads

pub mod category;
pub mod filters;
pub mod validators;

pub use filters::{NormalizedFilters, normalize_filters};
pub use validators::validate_attributes;
