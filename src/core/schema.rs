//! Attribute schema lookup
//!
//! Resolves which dynamic fields apply to a category, for the submission form
//! (`FieldKind::Create`) or for the search UI (`FieldKind::Search`).

use crate::core::category::{Category, FilterOption};
use std::collections::HashSet;

/// Which schema slot a caller is interested in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Create,
    Search,
}

/// Fields for a category, first non-empty slot wins
///
/// - `Create`: `createFields`, then `filters`, then `searchFilters`
/// - `Search`: `searchFilters`, then `filters`, then `createFields`
///
/// An unknown category has no fields.
pub fn fields_for_category(
    categories: &[Category],
    value: &str,
    kind: FieldKind,
) -> Vec<FilterOption> {
    let Some(category) = categories.iter().find(|c| c.value == value) else {
        return Vec::new();
    };

    let slots = match kind {
        FieldKind::Create => [
            &category.create_fields,
            &category.filters,
            &category.search_filters,
        ],
        FieldKind::Search => [
            &category.search_filters,
            &category.filters,
            &category.create_fields,
        ],
    };

    slots
        .into_iter()
        .filter_map(Option::as_ref)
        .find(|fields| !fields.is_empty())
        .cloned()
        .unwrap_or_default()
}

/// Labels of the search filters of a category
pub fn search_labels(categories: &[Category], value: &str) -> HashSet<String> {
    fields_for_category(categories, value, FieldKind::Search)
        .iter()
        .map(|f| f.label().to_string())
        .collect()
}
