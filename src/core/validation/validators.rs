//! Required-field validators for submitted listing attributes

use crate::core::category::FilterOption;
use crate::core::listing::Attributes;

fn present(attributes: &Attributes, key: &str) -> bool {
    attributes.get(key).is_some_and(|v| !v.is_empty())
}

fn missing(label: &str) -> String {
    format!("{} saknas", label)
}

/// Validator: select/chip value must be set
pub fn required_value() -> impl Fn(&str, &Attributes) -> Result<(), String> + Send + Sync + Clone {
    |label: &str, attributes: &Attributes| {
        if present(attributes, label) {
            Ok(())
        } else {
            Err(missing(label))
        }
    }
}

/// Validator: range needs a point value or a lower bound
///
/// The upper bound alone does not satisfy a required range.
pub fn required_lower_bound()
-> impl Fn(&str, &Attributes) -> Result<(), String> + Send + Sync + Clone {
    |label: &str, attributes: &Attributes| {
        if present(attributes, label) || present(attributes, &format!("{}-min", label)) {
            Ok(())
        } else {
            Err(missing(label))
        }
    }
}

/// Check submitted attributes against the required fields of a schema
///
/// Returns every violation, in schema order. An empty vector means valid.
pub fn validate_attributes(filters: &[FilterOption], attributes: &Attributes) -> Vec<String> {
    let value = required_value();
    let lower_bound = required_lower_bound();

    filters
        .iter()
        .filter(|f| f.is_required())
        .filter_map(|f| {
            let outcome = match f {
                FilterOption::Range { label, .. } => lower_bound(label, attributes),
                FilterOption::Select { label, .. } | FilterOption::Chip { label, .. } => {
                    value(label, attributes)
                }
            };
            outcome.err()
        })
        .collect()
}
