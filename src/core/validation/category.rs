//! Category invariants checked before admin writes

use crate::core::category::Category;

pub const MSG_VALUE_LABEL_REQUIRED: &str = "value och label krävs";
pub const MSG_DUPLICATE: &str = "Kategori med samma value finns redan";
pub const MSG_PARENT_MISSING: &str = "Förälderkategori finns inte";
pub const MSG_SELF_PARENT: &str = "Kategori kan inte vara förälder till sig själv";
pub const MSG_UPDATE_VALUE_REQUIRED: &str = "value krävs för att uppdatera";
pub const MSG_DELETE_VALUE_REQUIRED: &str = "value krävs för delete";

/// Parent reference must exist and must not point at the category itself
pub fn check_parent(value: &str, parent: &str, existing: &[Category]) -> Vec<String> {
    let mut errors = Vec::new();
    if !existing.iter().any(|c| c.value == parent) {
        errors.push(MSG_PARENT_MISSING.to_string());
    }
    if parent == value {
        errors.push(MSG_SELF_PARENT.to_string());
    }
    errors
}

/// Checks for a category that is about to be created
pub fn check_new_category(
    value: &str,
    label: &str,
    parent: Option<&str>,
    existing: &[Category],
) -> Vec<String> {
    let mut errors = Vec::new();
    if value.is_empty() || label.is_empty() {
        errors.push(MSG_VALUE_LABEL_REQUIRED.to_string());
    }
    if existing.iter().any(|c| c.value == value) {
        errors.push(MSG_DUPLICATE.to_string());
    }
    if let Some(parent) = parent {
        errors.extend(check_parent(value, parent, existing));
    }
    errors
}

/// Values removed when `value` is deleted: itself and its direct children
pub fn deletion_set(value: &str, existing: &[Category]) -> Vec<String> {
    std::iter::once(value.to_string())
        .chain(
            existing
                .iter()
                .filter(|c| c.parent_value.as_deref() == Some(value))
                .map(|c| c.value.clone()),
        )
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn existing() -> Vec<Category> {
        vec![
            Category::new("fordon", "Fordon"),
            Category::new("bilar", "Bilar").with_parent("fordon"),
            Category::new("hem", "Hem"),
        ]
    }

    #[test]
    fn test_new_category_ok() {
        assert!(check_new_category("mc", "Motorcyklar", Some("fordon"), &existing()).is_empty());
    }

    #[test]
    fn test_duplicate_and_missing_parent() {
        let errors = check_new_category("hem", "Hem", Some("saknas"), &existing());
        assert_eq!(errors, vec![MSG_DUPLICATE, MSG_PARENT_MISSING]);
    }

    #[test]
    fn test_self_parent() {
        assert_eq!(check_parent("hem", "hem", &existing()), vec![MSG_SELF_PARENT]);
    }

    #[test]
    fn test_missing_value_and_label() {
        assert_eq!(
            check_new_category("", "", None, &existing()),
            vec![MSG_VALUE_LABEL_REQUIRED]
        );
    }

    #[test]
    fn test_deletion_cascades_to_children() {
        assert_eq!(deletion_set("fordon", &existing()), vec!["fordon", "bilar"]);
        assert_eq!(deletion_set("hem", &existing()), vec!["hem"]);
    }
}
