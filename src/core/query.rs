//! Search request and result types

use crate::core::listing::{Listing, value_to_string};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Raw search query parameters as they arrive in the URL
///
/// # Example
/// ```text
/// GET /api/search?q=volvo&category=fordon&county=Stockholm
/// GET /api/search?category=fordon&filters={"Drivmedel":"El","Miltal-max":"20000"}
/// ```
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct SearchParams {
    /// Free text
    pub q: Option<String>,

    pub category: Option<String>,

    pub county: Option<String>,

    /// Attribute filters as a JSON object
    ///
    /// Keys are field labels (equality) or `<label>-min` / `<label>-max`
    /// (numeric bounds).
    pub filters: Option<String>,
}

impl SearchParams {
    /// Parse the filters JSON, treating a malformed payload as no filters
    pub fn filter_map(&self) -> HashMap<String, String> {
        let Some(raw) = self.filters.as_deref().filter(|s| !s.trim().is_empty()) else {
            return HashMap::new();
        };
        match serde_json::from_str::<HashMap<String, Value>>(raw) {
            Ok(map) => map
                .into_iter()
                .filter_map(|(k, v)| value_to_string(&v).map(|s| (k, s)))
                .collect(),
            Err(err) => {
                tracing::debug!(error = %err, "ignoring malformed filters payload");
                HashMap::new()
            }
        }
    }

    pub fn into_request(self) -> SearchRequest {
        let filters = self.filter_map();
        SearchRequest {
            q: self.q.unwrap_or_default(),
            category: self.category.filter(|c| !c.is_empty()),
            county: self.county.filter(|c| !c.is_empty()),
            filters,
        }
    }
}

/// A search over the listing snapshot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub q: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub county: Option<String>,
    #[serde(default)]
    pub filters: HashMap<String, String>,
}

impl SearchRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, q: impl Into<String>) -> Self {
        self.q = q.into();
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn county(mut self, county: impl Into<String>) -> Self {
        self.county = Some(county.into());
        self
    }

    pub fn filter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.insert(key.into(), value.into());
        self
    }

    /// Trimmed, lower-cased free text
    pub fn normalized_text(&self) -> String {
        self.q.trim().to_lowercase()
    }

    /// True when no text, category, county or non-empty filter is set
    pub fn is_unfiltered(&self) -> bool {
        self.normalized_text().is_empty()
            && self.category.is_none()
            && self.county.is_none()
            && self.filters.values().all(|v| v.is_empty())
    }
}

/// Matching listings plus their count
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub hits: Vec<Listing>,
    pub total: usize,
}

impl From<Vec<Listing>> for SearchResult {
    fn from(hits: Vec<Listing>) -> Self {
        let total = hits.len();
        Self { hits, total }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filters_json_is_parsed() {
        let params = SearchParams {
            filters: Some(r#"{"Drivmedel":"El","Miltal-max":20000,"Färg":null}"#.to_string()),
            ..Default::default()
        };
        let filters = params.filter_map();
        assert_eq!(filters.len(), 2);
        assert_eq!(filters["Miltal-max"], "20000");
    }

    #[test]
    fn test_malformed_filters_mean_no_filters() {
        let params = SearchParams {
            filters: Some("{not json".to_string()),
            ..Default::default()
        };
        assert!(params.filter_map().is_empty());
    }

    #[test]
    fn test_empty_category_is_ignored() {
        let request = SearchParams {
            q: Some("  ".to_string()),
            category: Some(String::new()),
            ..Default::default()
        }
        .into_request();
        assert!(request.category.is_none());
        assert!(request.is_unfiltered());
    }

    #[test]
    fn test_empty_filter_values_keep_request_unfiltered() {
        let request = SearchRequest::new().filter("Drivmedel", "");
        assert!(request.is_unfiltered());
        assert!(!SearchRequest::new().filter("Drivmedel", "El").is_unfiltered());
    }

    #[test]
    fn test_result_total_matches_hits() {
        let result = SearchResult::from(vec![Listing::new("a", "A"), Listing::new("b", "B")]);
        assert_eq!(result.total, 2);
    }
}
