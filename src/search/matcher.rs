//! Local query planner and matcher
//!
//! A [`QueryPlan`] is compiled once per request and then evaluated against
//! every listing of the snapshot. All predicates are conjunctive; evaluation
//! stops at the first one that fails.

use crate::core::category::Category;
use crate::core::listing::Listing;
use crate::core::query::SearchRequest;
use crate::core::schema::search_labels;
use std::collections::HashSet;

/// Filter key compared against the listing status instead of its attributes
pub const STATUS_KEY: &str = "status";

const MIN_SUFFIX: &str = "-min";
const MAX_SUFFIX: &str = "-max";

/// One attribute constraint of a request
#[derive(Debug, Clone, PartialEq)]
pub enum Clause {
    /// Listing status must equal the value
    Status(String),
    /// Numeric attribute must not be below the bound
    Min { base: String, key: String, bound: f64 },
    /// Numeric attribute must not exceed the bound
    Max { base: String, key: String, bound: f64 },
    /// Attribute must equal the value
    Equals { key: String, value: String },
}

impl Clause {
    fn holds(&self, listing: &Listing) -> bool {
        match self {
            Clause::Status(status) => listing.status.as_str() == status,
            Clause::Min { base, key, bound } => {
                numeric_attribute(listing, base, key).is_none_or(|v| v >= *bound)
            }
            Clause::Max { base, key, bound } => {
                numeric_attribute(listing, base, key).is_none_or(|v| v <= *bound)
            }
            Clause::Equals { key, value } => {
                listing.attributes.get(key).map(String::as_str).unwrap_or("") == value
            }
        }
    }
}

/// Parse a finite number, tolerating surrounding whitespace
pub fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Attribute at `base`, or at the bound key itself when `base` is unset
fn numeric_attribute(listing: &Listing, base: &str, key: &str) -> Option<f64> {
    listing
        .attribute(base)
        .or_else(|| listing.attribute(key))
        .and_then(parse_number)
}

/// Compiled form of a [`SearchRequest`]
#[derive(Debug, Clone, Default)]
pub struct QueryPlan {
    category: Option<String>,
    county: Option<String>,
    text: String,
    clauses: Vec<Clause>,
}

impl QueryPlan {
    /// Compile a request against the category schema
    ///
    /// When a category is selected only its search filter labels are honoured;
    /// other keys are dropped so stale client filters do not exclude anything.
    /// Without a category every key is honoured.
    pub fn compile(request: &SearchRequest, categories: &[Category]) -> Self {
        let allowed: Option<HashSet<String>> = request
            .category
            .as_deref()
            .map(|c| search_labels(categories, c));
        let is_allowed =
            |label: &str| allowed.as_ref().is_none_or(|labels| labels.contains(label));

        let mut clauses = Vec::new();
        for (key, value) in &request.filters {
            if value.is_empty() {
                continue;
            }

            if key == STATUS_KEY {
                clauses.push(Clause::Status(value.clone()));
                continue;
            }

            if let Some(base) = key.strip_suffix(MIN_SUFFIX) {
                if !is_allowed(base) {
                    tracing::debug!(key = %key, "skipping filter outside category schema");
                    continue;
                }
                // A non-numeric bound can never exclude anything.
                if let Some(bound) = parse_number(value) {
                    clauses.push(Clause::Min {
                        base: base.to_string(),
                        key: key.clone(),
                        bound,
                    });
                }
            } else if let Some(base) = key.strip_suffix(MAX_SUFFIX) {
                if !is_allowed(base) {
                    tracing::debug!(key = %key, "skipping filter outside category schema");
                    continue;
                }
                if let Some(bound) = parse_number(value) {
                    clauses.push(Clause::Max {
                        base: base.to_string(),
                        key: key.clone(),
                        bound,
                    });
                }
            } else if is_allowed(key) {
                clauses.push(Clause::Equals {
                    key: key.clone(),
                    value: value.clone(),
                });
            } else {
                tracing::debug!(key = %key, "skipping filter outside category schema");
            }
        }

        Self {
            category: request.category.clone(),
            county: request.county.clone(),
            text: request.normalized_text(),
            clauses,
        }
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    /// Structural, text and attribute predicates
    pub fn matches(&self, listing: &Listing) -> bool {
        if let Some(category) = &self.category {
            if listing.category.as_ref() != Some(category) {
                return false;
            }
        }

        if let Some(county) = &self.county {
            if listing.county.as_ref() != Some(county) {
                return false;
            }
        }

        if !self.text.is_empty() && !listing.haystack().contains(&self.text) {
            return false;
        }

        self.matches_attributes(listing)
    }

    /// Attribute predicates only, used to post-filter external index hits
    pub fn matches_attributes(&self, listing: &Listing) -> bool {
        self.clauses.iter().all(|clause| clause.holds(listing))
    }
}

/// Match a request against a listing snapshot
///
/// Hits keep the snapshot order.
pub fn match_listings(
    request: &SearchRequest,
    listings: &[Listing],
    categories: &[Category],
) -> Vec<Listing> {
    let plan = QueryPlan::compile(request, categories);
    listings
        .iter()
        .filter(|listing| plan.matches(listing))
        .cloned()
        .collect()
}

/// Apply only the attribute predicates of a request
pub fn post_filter(
    request: &SearchRequest,
    hits: Vec<Listing>,
    categories: &[Category],
) -> Vec<Listing> {
    let plan = QueryPlan::compile(request, categories);
    hits.into_iter()
        .filter(|listing| plan.matches_attributes(listing))
        .collect()
}
