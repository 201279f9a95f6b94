//! Normalization of admin-submitted filter definitions
//!
//! Category payloads arrive as loose JSON. Each entry is trimmed and checked
//! before it becomes a [`FilterOption`]; entries that fail are dropped and
//! reported, valid ones are kept.

use crate::core::category::{ChipUi, FilterOption, RangeUi, SelectUi};
use crate::core::listing::value_to_string;
use serde_json::Value;

/// Schema slot names used as error prefixes
pub const CREATE_PREFIX: &str = "Publicera-fält";
pub const SEARCH_PREFIX: &str = "Sök-filter";

/// Outcome of normalizing a list of filter definitions
#[derive(Debug, Default, Clone, PartialEq)]
pub struct NormalizedFilters {
    pub filters: Vec<FilterOption>,
    pub errors: Vec<String>,
}

fn trimmed_str(item: &Value, key: &str) -> String {
    item.get(key)
        .and_then(Value::as_str)
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}

fn bound(item: &Value, key: &str) -> String {
    item.get(key).and_then(value_to_string).unwrap_or_default()
}

/// Normalize raw filter definitions
///
/// A non-array payload yields no filters and no errors.
pub fn normalize_filters(raw: &Value, prefix: &str) -> NormalizedFilters {
    let mut out = NormalizedFilters::default();
    let Some(items) = raw.as_array() else {
        return out;
    };

    for (idx, item) in items.iter().enumerate() {
        let position = idx + 1;
        let label = trimmed_str(item, "label");
        let required = item.get("required").is_some_and(truthy);
        let name = if label.is_empty() {
            position.to_string()
        } else {
            label.clone()
        };

        match item.get("type").and_then(Value::as_str) {
            Some(kind @ ("select" | "chip")) => {
                let options: Vec<String> = item
                    .get("options")
                    .and_then(Value::as_array)
                    .map(|opts| {
                        opts.iter()
                            .filter_map(value_to_string)
                            .map(|o| o.trim().to_string())
                            .filter(|o| !o.is_empty())
                            .collect()
                    })
                    .unwrap_or_default();

                if label.is_empty() {
                    out.errors.push(format!("{} {}: label saknas", prefix, position));
                }
                if options.is_empty() {
                    out.errors
                        .push(format!("{} {}: lägg till minst ett val", prefix, name));
                }
                if !label.is_empty() && !options.is_empty() {
                    out.filters.push(if kind == "select" {
                        FilterOption::Select {
                            label,
                            options,
                            ui: SelectUi::Dropdown,
                            required,
                        }
                    } else {
                        FilterOption::Chip {
                            label,
                            options,
                            ui: ChipUi::Chip,
                            required,
                        }
                    });
                }
            }
            Some("range") => {
                let min = bound(item, "min");
                let max = bound(item, "max");
                let ui = match item.get("ui").and_then(Value::as_str) {
                    Some("slider") => RangeUi::Slider,
                    _ => RangeUi::Number,
                };
                let placeholder = item
                    .get("placeholder")
                    .and_then(Value::as_str)
                    .map(str::to_string);

                if label.is_empty() {
                    out.errors.push(format!("{} {}: label saknas", prefix, position));
                }
                if min.is_empty() || max.is_empty() {
                    out.errors.push(format!("{} {}: min och max krävs", prefix, name));
                }
                if !label.is_empty() && !min.is_empty() && !max.is_empty() {
                    out.filters.push(FilterOption::Range {
                        label,
                        min,
                        max,
                        ui,
                        placeholder,
                        required,
                    });
                }
            }
            Some(other) => {
                out.errors
                    .push(format!("{} {}: okänd typ {}", prefix, position, other));
            }
            None => {}
        }
    }

    out
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Null => false,
        _ => true,
    }
}
