//! Category taxonomy and per-category attribute schemas

use crate::core::listing::value_to_string;
use serde::de::Deserializer;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Rendering hint for range fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RangeUi {
    Slider,
    #[default]
    Number,
}

/// Rendering hint for select fields, always `dropdown`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SelectUi {
    #[default]
    Dropdown,
}

/// Rendering hint for chip fields, always `chip`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ChipUi {
    #[default]
    Chip,
}

/// One dynamic field of a category schema
///
/// Serialized with an internal `type` tag (`select`, `chip`, `range`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FilterOption {
    /// Single-choice dropdown
    Select {
        label: String,
        options: Vec<String>,
        #[serde(default, deserialize_with = "fixed_hint")]
        ui: SelectUi,
        #[serde(default)]
        required: bool,
    },
    /// Toggleable tags; a single value is selected at a time
    Chip {
        label: String,
        options: Vec<String>,
        #[serde(default, deserialize_with = "fixed_hint")]
        ui: ChipUi,
        #[serde(default)]
        required: bool,
    },
    /// Numeric range, bounds kept as strings
    Range {
        label: String,
        #[serde(deserialize_with = "lenient_string")]
        min: String,
        #[serde(deserialize_with = "lenient_string")]
        max: String,
        #[serde(default)]
        ui: RangeUi,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        placeholder: Option<String>,
        #[serde(default)]
        required: bool,
    },
}

impl FilterOption {
    pub fn select(label: impl Into<String>, options: &[&str]) -> Self {
        FilterOption::Select {
            label: label.into(),
            options: options.iter().map(|o| o.to_string()).collect(),
            ui: SelectUi::Dropdown,
            required: false,
        }
    }

    pub fn chip(label: impl Into<String>, options: &[&str]) -> Self {
        FilterOption::Chip {
            label: label.into(),
            options: options.iter().map(|o| o.to_string()).collect(),
            ui: ChipUi::Chip,
            required: false,
        }
    }

    pub fn range(label: impl Into<String>, min: impl Into<String>, max: impl Into<String>) -> Self {
        FilterOption::Range {
            label: label.into(),
            min: min.into(),
            max: max.into(),
            ui: RangeUi::Number,
            placeholder: None,
            required: false,
        }
    }

    /// Mark the field as required on submission
    pub fn required(mut self) -> Self {
        match &mut self {
            FilterOption::Select { required, .. }
            | FilterOption::Chip { required, .. }
            | FilterOption::Range { required, .. } => *required = true,
        }
        self
    }

    pub fn label(&self) -> &str {
        match self {
            FilterOption::Select { label, .. }
            | FilterOption::Chip { label, .. }
            | FilterOption::Range { label, .. } => label,
        }
    }

    pub fn is_required(&self) -> bool {
        match self {
            FilterOption::Select { required, .. }
            | FilterOption::Chip { required, .. }
            | FilterOption::Range { required, .. } => *required,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            FilterOption::Select { .. } => "select",
            FilterOption::Chip { .. } => "chip",
            FilterOption::Range { .. } => "range",
        }
    }
}

/// A taxonomy node
///
/// `filters` is the legacy single schema slot. Records written before the
/// create/search split only carry that one, so lookups fall back across slots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub value: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_fields: Option<Vec<FilterOption>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_filters: Option<Vec<FilterOption>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filters: Option<Vec<FilterOption>>,
}

impl Category {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
            parent_value: None,
            create_fields: None,
            search_filters: None,
            filters: None,
        }
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent_value = Some(parent.into());
        self
    }

    pub fn with_create_fields(mut self, fields: Vec<FilterOption>) -> Self {
        self.create_fields = Some(fields);
        self
    }

    pub fn with_search_filters(mut self, fields: Vec<FilterOption>) -> Self {
        self.search_filters = Some(fields);
        self
    }

    pub fn with_legacy_filters(mut self, fields: Vec<FilterOption>) -> Self {
        self.filters = Some(fields);
        self
    }

    /// Fill every schema slot from its fallbacks, as the stores do on load
    pub fn normalized(mut self) -> Self {
        let create = first_present(&[&self.create_fields, &self.filters]);
        let search = first_present(&[&self.search_filters, &self.filters, &self.create_fields]);
        let legacy = first_present(&[&self.filters, &self.create_fields, &self.search_filters]);
        self.create_fields = Some(create);
        self.search_filters = Some(search);
        self.filters = Some(legacy);
        self
    }
}

fn first_present(slots: &[&Option<Vec<FilterOption>>]) -> Vec<FilterOption> {
    slots
        .iter()
        .find_map(|slot| slot.as_ref())
        .cloned()
        .unwrap_or_default()
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Value::deserialize(deserializer)?;
    Ok(value_to_string(&raw).unwrap_or_default())
}

/// Accept whatever hint a stored record carries and use the fixed one
fn fixed_hint<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default,
{
    serde::de::IgnoredAny::deserialize(deserializer)?;
    Ok(T::default())
}
