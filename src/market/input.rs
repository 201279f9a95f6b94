//! Write payloads accepted by the marketplace

use crate::core::listing::{
    Attributes, Listing, ListingStatus, SellerKind, lenient_string_map, value_to_string,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

pub const DEFAULT_COUNTY: &str = "Stockholm";

/// A listing as submitted by a seller
///
/// Everything is optional at this point; [`crate::market::Marketplace`]
/// decides what is missing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListingDraft {
    pub id: Option<String>,
    pub title: Option<String>,
    /// Display price; numbers are accepted and stringified
    pub price: Option<Value>,
    pub price_value: Option<f64>,
    pub description: Option<String>,
    pub images: Vec<String>,
    pub meta: Option<String>,
    pub seller: Option<SellerKind>,
    pub status: Option<ListingStatus>,
    pub category: Option<String>,
    pub county: Option<String>,
    pub city: Option<String>,
    pub seller_name: Option<String>,
    pub seller_phone: Option<String>,
    pub seller_email: Option<String>,
    pub seller_website: Option<String>,
    #[serde(deserialize_with = "lenient_string_map")]
    pub attributes: Attributes,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl ListingDraft {
    pub fn new(title: impl Into<String>, price: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            price: Some(Value::String(price.into())),
            ..Self::default()
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn title(&self) -> Option<&str> {
        non_empty(&self.title)
    }

    pub fn price(&self) -> Option<String> {
        self.price
            .as_ref()
            .and_then(value_to_string)
            .filter(|p| !p.trim().is_empty())
    }

    pub fn category(&self) -> Option<&str> {
        non_empty(&self.category)
    }

    /// Build the stored listing, filling in defaults
    ///
    /// Callers must have checked that title and price are present.
    pub fn into_listing(self, now: DateTime<Utc>) -> Listing {
        let title = self.title().unwrap_or_default().to_string();
        let price = self.price().unwrap_or_default();
        let category = self.category().map(str::to_string);
        let id = match non_empty(&self.id) {
            Some(id) => id.to_string(),
            None => listing_id(&title, now),
        };

        Listing {
            id,
            title,
            price,
            price_value: self.price_value,
            description: self.description,
            images: self.images,
            meta: Some(self.meta.unwrap_or_default()),
            created_at: now,
            seller: self.seller.unwrap_or_default(),
            status: self.status.unwrap_or(ListingStatus::Active),
            county: Some(
                non_empty(&self.county)
                    .unwrap_or(DEFAULT_COUNTY)
                    .to_string(),
            ),
            city: self.city,
            category,
            seller_name: self.seller_name,
            seller_phone: self.seller_phone,
            seller_email: self.seller_email,
            seller_website: self.seller_website,
            attributes: self.attributes,
        }
    }
}

/// Lower-cased title with whitespace runs turned into dashes, plus epoch millis
pub fn listing_id(title: &str, now: DateTime<Utc>) -> String {
    let slug = title
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-");
    format!("{}-{}", slug, now.timestamp_millis())
}

/// Moderation request for one listing
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StatusUpdate {
    pub id: Option<String>,
    pub status: Option<String>,
}

/// Admin payload for creating or updating a category
///
/// Filter slots are kept as raw JSON until they are normalized. An absent
/// slot and a `null` slot mean the same thing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CategoryInput {
    pub value: Option<String>,
    pub label: Option<String>,
    /// On update, an empty string clears the parent
    pub parent_value: Option<String>,
    pub create_fields: Option<Value>,
    pub search_filters: Option<Value>,
    pub filters: Option<Value>,
}

impl CategoryInput {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: Some(value.into()),
            label: Some(label.into()),
            ..Self::default()
        }
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent_value = Some(parent.into());
        self
    }

    pub fn with_create_fields(mut self, fields: Value) -> Self {
        self.create_fields = Some(fields);
        self
    }

    pub fn with_search_filters(mut self, fields: Value) -> Self {
        self.search_filters = Some(fields);
        self
    }

    pub fn value(&self) -> String {
        non_empty(&self.value).unwrap_or_default().to_string()
    }

    pub fn label(&self) -> String {
        non_empty(&self.label).unwrap_or_default().to_string()
    }

    pub fn parent(&self) -> Option<String> {
        non_empty(&self.parent_value).map(str::to_string)
    }

    /// Raw create-field definitions: createFields, then filters
    pub fn raw_create_fields(&self) -> Option<&Value> {
        self.create_fields.as_ref().or(self.filters.as_ref())
    }

    /// Raw search-filter definitions: searchFilters, then filters, then createFields
    pub fn raw_search_filters(&self) -> Option<&Value> {
        self.search_filters
            .as_ref()
            .or(self.filters.as_ref())
            .or(self.create_fields.as_ref())
    }
}

/// Identifies a category to delete
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CategoryRef {
    pub value: Option<String>,
}
