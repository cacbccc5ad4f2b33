//! Menu category tests
//!
//! Tests for category input validation and normalization

use proptest::prelude::*;
use validator::Validate;

use shared::models::{CreateCategoryInput, UpdateCategoryInput};

fn create(name: &str, description: Option<&str>) -> CreateCategoryInput {
    CreateCategoryInput {
        name: name.to_string(),
        description: description.map(str::to_string),
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_name_is_trimmed() {
        let input = create("  Burgers  ", Some("   ")).normalized();
        assert_eq!(input.name, "Burgers");
        assert_eq!(input.description, None);
        assert!(input.validate().is_ok());
    }

    #[test]
    fn test_blank_name_is_rejected() {
        let input = create("   ", None).normalized();
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_name_length_limit() {
        assert!(create(&"a".repeat(100), None).validate().is_ok());
        assert!(create(&"a".repeat(101), None).validate().is_err());
    }

    #[test]
    fn test_update_keeps_empty_description_to_clear_it() {
        let input = UpdateCategoryInput {
            name: None,
            description: Some("  ".to_string()),
        }
        .normalized();
        assert_eq!(input.description.as_deref(), Some(""));
        assert!(input.validate().is_ok());
    }

    #[test]
    fn test_validation_message() {
        let errors = create("", None).validate().unwrap_err();
        let field_errors = errors.field_errors();
        let message = field_errors["name"][0].message.as_ref().unwrap();
        assert_eq!(message, "Category name must be 1-100 characters");
    }
}

// ============================================================================
// Property Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Any non-blank name up to 100 characters is accepted once trimmed
        #[test]
        fn prop_valid_names_accepted(
            name in "[A-Za-z][A-Za-z &'-]{0,98}",
            pad in 0usize..5
        ) {
            let padded = format!("{}{}{}", " ".repeat(pad), name, " ".repeat(pad));
            let input = create(&padded, None).normalized();
            prop_assert_eq!(input.name.as_str(), name.trim());
            prop_assert!(input.validate().is_ok());
        }

        /// Normalizing twice changes nothing
        #[test]
        fn prop_normalize_is_idempotent(name in "\\PC{0,40}", description in proptest::option::of("\\PC{0,40}")) {
            let once = create(&name, description.as_deref()).normalized();
            let twice = once.clone().normalized();
            prop_assert_eq!(once.name, twice.name);
            prop_assert_eq!(once.description, twice.description);
        }
    }
}
