//! Listing model
//!
//! A listing is a single marketplace ad. Only the fields the search core reads
//! carry behaviour; the rest are transported as-is between the stores, the
//! external index and the HTTP layer.

use chrono::{DateTime, Utc};
use serde::de::Deserializer;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Dynamic attribute values keyed by field label (or `<label>-min`/`<label>-max`)
pub type Attributes = HashMap<String, String>;

/// Moderation state of a listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ListingStatus {
    Draft,
    Pending,
    #[default]
    Active,
    Rejected,
    Expired,
}

impl ListingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListingStatus::Draft => "draft",
            ListingStatus::Pending => "pending",
            ListingStatus::Active => "active",
            ListingStatus::Rejected => "rejected",
            ListingStatus::Expired => "expired",
        }
    }
}

impl fmt::Display for ListingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ListingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(ListingStatus::Draft),
            "pending" => Ok(ListingStatus::Pending),
            "active" => Ok(ListingStatus::Active),
            "rejected" => Ok(ListingStatus::Rejected),
            "expired" => Ok(ListingStatus::Expired),
            other => Err(format!("unknown listing status '{}'", other)),
        }
    }
}

/// Who is selling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SellerKind {
    #[default]
    Privat,
    #[serde(rename = "Företag")]
    Foretag,
}

/// A marketplace ad
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub price_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<String>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub seller: SellerKind,
    #[serde(default)]
    pub status: ListingStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub county: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seller_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seller_phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seller_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seller_website: Option<String>,
    #[serde(default, deserialize_with = "lenient_string_map")]
    pub attributes: Attributes,
}

impl Listing {
    /// Create an active listing with only the required fields set
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            price: String::new(),
            price_value: None,
            description: None,
            images: Vec::new(),
            meta: None,
            created_at: Utc::now(),
            seller: SellerKind::default(),
            status: ListingStatus::Active,
            county: None,
            city: None,
            category: None,
            seller_name: None,
            seller_phone: None,
            seller_email: None,
            seller_website: None,
            attributes: Attributes::new(),
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_county(mut self, county: impl Into<String>) -> Self {
        self.county = Some(county.into());
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Lower-cased text the free-text filter searches in
    pub fn haystack(&self) -> String {
        format!(
            "{} {} {} {}",
            self.title,
            self.meta.as_deref().unwrap_or(""),
            self.description.as_deref().unwrap_or(""),
            self.seller_name.as_deref().unwrap_or("")
        )
        .to_lowercase()
    }

    /// Attribute value, treating an empty string as absent
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }
}

/// Stringify a JSON scalar the way form payloads are compared
pub fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}

/// Deserialize a map whose values may be strings, numbers or booleans
///
/// Null values are dropped; a missing or null map becomes empty.
pub fn lenient_string_map<'de, D>(deserializer: D) -> Result<HashMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<HashMap<String, Value>> = Option::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .filter_map(|(k, v)| value_to_string(&v).map(|s| (k, s)))
        .collect())
}
