//! Ingredient usage report tests
//!
//! Tests for the report inputs and the stock ledger:
//! - Strict report date parsing with fallback to today
//! - Reversed ranges select nothing
//! - Stock deltas per movement type

use chrono::{Duration, NaiveDate};
use proptest::prelude::*;
use rust_decimal::Decimal;

use shared::models::MovementType;
use shared::validation::{is_low_stock, parse_report_date, resolve_report_range};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 8, 15).unwrap()
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_parse_report_date() {
        assert_eq!(parse_report_date("2024-02-29"), NaiveDate::from_ymd_opt(2024, 2, 29));
        assert_eq!(parse_report_date(" 2024-01-05 "), NaiveDate::from_ymd_opt(2024, 1, 5));
        assert_eq!(parse_report_date("2023-02-29"), None);
        assert_eq!(parse_report_date("2024-1-5"), None);
        assert_eq!(parse_report_date("05/01/2024"), None);
        assert_eq!(parse_report_date("2024-01-05T00:00:00"), None);
        assert_eq!(parse_report_date(""), None);
    }

    #[test]
    fn test_bounds_default_independently() {
        let range = resolve_report_range(Some("2024-08-01"), Some("garbage"), today());
        assert_eq!(range.start, NaiveDate::from_ymd_opt(2024, 8, 1).unwrap());
        assert_eq!(range.end, today());

        let range = resolve_report_range(None, None, today());
        assert_eq!((range.start, range.end), (today(), today()));
        assert!(!range.is_empty());
    }

    #[test]
    fn test_reversed_range_is_empty() {
        let range = resolve_report_range(Some("2024-08-20"), Some("2024-08-10"), today());
        assert!(range.is_empty());
        assert!(!range.contains(NaiveDate::from_ymd_opt(2024, 8, 15).unwrap()));
    }

    #[test]
    fn test_low_stock_is_strictly_below_threshold() {
        let threshold = Decimal::from(10);
        assert!(is_low_stock(Decimal::new(99, 1), threshold));
        assert!(!is_low_stock(threshold, threshold));
        assert!(is_low_stock(Decimal::from(-3), threshold));
    }

    #[test]
    fn test_negative_balance_is_possible() {
        let mut balance = Decimal::from(2);
        balance += MovementType::Consumption.stock_delta(Decimal::from(5));
        assert_eq!(balance, Decimal::from(-3));
    }
}

// ============================================================================
// Property Tests
// ============================================================================

fn date_strategy() -> impl Strategy<Value = NaiveDate> {
    (0i64..3650).prop_map(|days| NaiveDate::from_ymd_opt(2020, 1, 1).unwrap() + Duration::days(days))
}

fn movement_strategy() -> impl Strategy<Value = (MovementType, Decimal)> {
    (
        prop_oneof![
            Just(MovementType::Purchase),
            Just(MovementType::Consumption),
            Just(MovementType::Waste),
        ],
        (1i64..100_000).prop_map(|q| Decimal::new(q, 3)),
    )
}

#[cfg(test)]
mod property_tests {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        /// Any well-formed date parses back to itself
        #[test]
        fn prop_formatted_dates_parse(date in date_strategy()) {
            let text = date.format("%Y-%m-%d").to_string();
            prop_assert_eq!(parse_report_date(&text), Some(date));
        }

        /// A range is empty exactly when to precedes from
        #[test]
        fn prop_range_empty_iff_reversed(from in date_strategy(), to in date_strategy()) {
            let from_text = from.format("%Y-%m-%d").to_string();
            let to_text = to.format("%Y-%m-%d").to_string();
            let range = resolve_report_range(Some(&from_text), Some(&to_text), today());

            prop_assert_eq!(range.is_empty(), to < from);
            if !range.is_empty() {
                prop_assert!(range.contains(from));
                prop_assert!(range.contains(to));
            }
        }

        /// Arbitrary text never panics and always yields a concrete range
        #[test]
        fn prop_malformed_dates_fall_back(from in "\\PC{0,20}", to in "\\PC{0,20}") {
            let range = resolve_report_range(Some(&from), Some(&to), today());
            if parse_report_date(&from).is_none() {
                prop_assert_eq!(range.start, today());
            }
            if parse_report_date(&to).is_none() {
                prop_assert_eq!(range.end, today());
            }
        }

        /// Balance equals purchases minus consumption and waste
        #[test]
        fn prop_balance_matches_ledger(
            opening in (0i64..1_000_000).prop_map(|q| Decimal::new(q, 3)),
            movements in prop::collection::vec(movement_strategy(), 0..30)
        ) {
            let mut balance = opening;
            let mut purchased = Decimal::ZERO;
            let mut used = Decimal::ZERO;

            for (kind, qty) in &movements {
                prop_assert!(kind.validate_quantity(*qty).is_ok());
                balance += kind.stock_delta(*qty);
                match kind {
                    MovementType::Purchase => purchased += qty,
                    _ => used += qty,
                }
            }

            prop_assert_eq!(balance, opening + purchased - used);
        }
    }
}
