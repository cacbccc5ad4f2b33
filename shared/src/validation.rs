//! Validation utilities for the Restaurant POS admin platform

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;

use crate::types::DateRange;

static REPORT_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid date pattern"));

// ============================================================================
// Report Date Ranges
// ============================================================================

/// Parse a strict `YYYY-MM-DD` date; anything else is rejected
pub fn parse_report_date(input: &str) -> Option<NaiveDate> {
    let input = input.trim();
    if !REPORT_DATE.is_match(input) {
        return None;
    }
    NaiveDate::parse_from_str(input, "%Y-%m-%d").ok()
}

/// Parse a report date, falling back to `today` when missing or malformed
pub fn report_date_or_today(input: Option<&str>, today: NaiveDate) -> NaiveDate {
    input.and_then(parse_report_date).unwrap_or(today)
}

/// Resolve the inclusive report range; each bound falls back to `today` on its own
pub fn resolve_report_range(from: Option<&str>, to: Option<&str>, today: NaiveDate) -> DateRange {
    DateRange {
        start: report_date_or_today(from, today),
        end: report_date_or_today(to, today),
    }
}

// ============================================================================
// General Validations
// ============================================================================

/// Trim free text, mapping blank strings to `None`
pub fn normalize_optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// ============================================================================
// Stored Numeric Columns
// ============================================================================

/// Why a value does not fit its column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericOverflow {
    /// More fractional digits than the column keeps
    Scale,
    /// More integer digits than the column holds
    Magnitude,
}

/// Precision and scale of a `DECIMAL(p, s)` column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumericColumn {
    pub precision: u32,
    pub scale: u32,
}

impl NumericColumn {
    /// Batch targets and oil usage units
    pub const UNITS: NumericColumn = NumericColumn { precision: 12, scale: 2 };
    /// Ingredient movement quantities and stock balances
    pub const STOCK_QUANTITY: NumericColumn = NumericColumn { precision: 14, scale: 3 };
    /// Ingredient cost per unit
    pub const UNIT_COST: NumericColumn = NumericColumn { precision: 12, scale: 4 };

    /// Values are rejected rather than rounded by the database
    pub fn check(&self, value: Decimal) -> Result<(), NumericOverflow> {
        if value.normalize().scale() > self.scale {
            return Err(NumericOverflow::Scale);
        }
        let limit = Decimal::from(10u64.pow(self.precision - self.scale));
        if value.abs() >= limit {
            return Err(NumericOverflow::Magnitude);
        }
        Ok(())
    }
}

/// Validate an oil batch usage target
pub fn validate_target_usage(units: Decimal) -> Result<(), &'static str> {
    if units <= Decimal::ZERO {
        return Err("Target usage must be positive");
    }
    match NumericColumn::UNITS.check(units) {
        Err(NumericOverflow::Scale) => Err("Target usage allows at most 2 decimal places"),
        Err(NumericOverflow::Magnitude) => Err("Target usage is too large"),
        Ok(()) => Ok(()),
    }
}

/// Validate a recorded usage amount
pub fn validate_usage_units(units: Decimal) -> Result<(), &'static str> {
    if units <= Decimal::ZERO {
        return Err("Usage units must be positive");
    }
    match NumericColumn::UNITS.check(units) {
        Err(NumericOverflow::Scale) => Err("Usage units allow at most 2 decimal places"),
        Err(NumericOverflow::Magnitude) => Err("Usage units are too large"),
        Ok(()) => Ok(()),
    }
}

/// Validate an ingredient quantity or opening balance
pub fn validate_stock_quantity(quantity: Decimal) -> Result<(), &'static str> {
    match NumericColumn::STOCK_QUANTITY.check(quantity) {
        Err(NumericOverflow::Scale) => Err("Quantity allows at most 3 decimal places"),
        Err(NumericOverflow::Magnitude) => Err("Quantity is too large"),
        Ok(()) => Ok(()),
    }
}

/// Validate an ingredient cost per unit
pub fn validate_unit_cost(cost: Decimal) -> Result<(), &'static str> {
    if cost < Decimal::ZERO {
        return Err("Cost per unit cannot be negative");
    }
    match NumericColumn::UNIT_COST.check(cost) {
        Err(NumericOverflow::Scale) => Err("Cost per unit allows at most 4 decimal places"),
        Err(NumericOverflow::Magnitude) => Err("Cost per unit is too large"),
        Ok(()) => Ok(()),
    }
}

/// Display-only low-stock flag
pub fn is_low_stock(current_stock_quantity: Decimal, threshold: Decimal) -> bool {
    current_stock_quantity < threshold
}

/// Default low-stock display threshold
pub const DEFAULT_LOW_STOCK_THRESHOLD: i64 = 10;

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_report_date_valid() {
        assert_eq!(parse_report_date("2024-02-29"), Some(date(2024, 2, 29)));
        assert_eq!(parse_report_date(" 2024-01-05 "), Some(date(2024, 1, 5)));
    }

    #[test]
    fn test_parse_report_date_invalid() {
        assert_eq!(parse_report_date("2024-1-5"), None);
        assert_eq!(parse_report_date("2023-02-29"), None);
        assert_eq!(parse_report_date("05/01/2024"), None);
        assert_eq!(parse_report_date("2024-01-05; DROP TABLE"), None);
        assert_eq!(parse_report_date(""), None);
    }

    #[test]
    fn test_resolve_report_range_defaults_each_bound() {
        let today = date(2024, 7, 15);

        let range = resolve_report_range(Some("2024-07-01"), Some("bogus"), today);
        assert_eq!(range.start, date(2024, 7, 1));
        assert_eq!(range.end, today);

        let range = resolve_report_range(None, None, today);
        assert_eq!(range.start, today);
        assert_eq!(range.end, today);
    }

    #[test]
    fn test_normalize_optional_text() {
        assert_eq!(normalize_optional_text(Some("  ".to_string())), None);
        assert_eq!(
            normalize_optional_text(Some(" Crispy ".to_string())),
            Some("Crispy".to_string())
        );
        assert_eq!(normalize_optional_text(None), None);
    }

    #[test]
    fn test_low_stock_is_strict() {
        let threshold = Decimal::from(DEFAULT_LOW_STOCK_THRESHOLD);
        assert!(is_low_stock(Decimal::new(99, 1), threshold));
        assert!(!is_low_stock(Decimal::from(10), threshold));
        assert!(is_low_stock(Decimal::from(-3), threshold));
    }

    #[test]
    fn test_usage_validations() {
        assert!(validate_target_usage(Decimal::from(200)).is_ok());
        assert!(validate_target_usage(Decimal::ZERO).is_err());
        assert!(validate_usage_units(Decimal::new(5, 1)).is_ok());
        assert!(validate_usage_units(Decimal::from(-1)).is_err());
    }

    #[test]
    fn test_usage_values_must_fit_their_columns() {
        assert_eq!(
            validate_target_usage(Decimal::new(4, 3)),
            Err("Target usage allows at most 2 decimal places")
        );
        assert!(validate_target_usage(Decimal::new(12550, 2)).is_ok());
        // Trailing zeros do not count against the scale
        assert!(validate_target_usage(Decimal::new(2000000, 4)).is_ok());
        assert_eq!(
            validate_target_usage(Decimal::from(10_000_000_000i64)),
            Err("Target usage is too large")
        );
        assert!(validate_target_usage(Decimal::new(999_999_999_999, 2)).is_ok());

        assert!(validate_usage_units(Decimal::new(125, 3)).is_err());
        assert!(validate_usage_units(Decimal::from(10_000_000_000i64)).is_err());
    }

    #[test]
    fn test_stock_and_cost_columns() {
        assert_eq!(
            validate_stock_quantity(Decimal::new(4, 4)),
            Err("Quantity allows at most 3 decimal places")
        );
        assert!(validate_stock_quantity(Decimal::new(-1250, 3)).is_ok());
        assert_eq!(
            validate_stock_quantity(Decimal::from(100_000_000_000i64)),
            Err("Quantity is too large")
        );

        assert!(validate_unit_cost(Decimal::new(12345, 4)).is_ok());
        assert!(validate_unit_cost(Decimal::new(12345, 5)).is_err());
        assert!(validate_unit_cost(Decimal::from(-1)).is_err());
        assert!(validate_unit_cost(Decimal::from(100_000_000)).is_err());
    }
}
