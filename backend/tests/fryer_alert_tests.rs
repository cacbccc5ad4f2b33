//! Fryer oil alert tests
//!
//! Tests for oil batch tracking including:
//! - Usage at or past target always alerts high
//! - Usage between the medium and high tiers alerts medium when time is quiet
//! - Evaluation is deterministic
//! - Closed batches never alert

use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;
use uuid::Uuid;

use shared::alerts::{
    alert_severity, compute_usage_stat, evaluate_alert, sort_alerts, usage_bar_tier,
    usage_percentage, AlertSeverity, AlertThresholds, UsageBarTier,
};
use shared::models::{BatchStatus, OilBatch};

// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn added_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 7, 1, 9, 0, 0).unwrap()
}

fn batch(status: BatchStatus, target: Decimal) -> OilBatch {
    OilBatch {
        id: Uuid::new_v4(),
        fryer_id: Uuid::new_v4(),
        fryer_name: "Fryer 1".to_string(),
        batch_name: "Fryer 1 2024-07-01 09:00".to_string(),
        oil_added_at: added_at(),
        target_usage_units: target,
        status,
        closed_at: None,
        notes: None,
        created_at: added_at(),
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_usage_percentage() {
        assert_eq!(usage_percentage(dec("45"), dec("60")), dec("75"));
        assert_eq!(usage_percentage(dec("1"), dec("3")), dec("33.33"));
        assert_eq!(usage_percentage(dec("10"), Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn test_elapsed_hours_from_stat() {
        let stat = compute_usage_stat(dec("10"), dec("100"), added_at(), added_at() + Duration::minutes(90));
        assert_eq!(stat.time_elapsed_hours, dec("1.5"));
    }

    #[test]
    fn test_time_alone_escalates() {
        let thresholds = AlertThresholds::default();
        let stat = compute_usage_stat(dec("5"), dec("100"), added_at(), added_at() + Duration::hours(100));
        assert_eq!(alert_severity(&stat, &thresholds), Some(AlertSeverity::High));

        let alert = evaluate_alert(&batch(BatchStatus::Active, dec("100")), &stat, &thresholds).unwrap();
        assert_eq!(alert.message, "Oil in use for 100.0 hours");
    }

    #[test]
    fn test_alert_message_lists_both_reasons() {
        let thresholds = AlertThresholds::default();
        let stat = compute_usage_stat(dec("70"), dec("100"), added_at(), added_at() + Duration::hours(50));
        let alert = evaluate_alert(&batch(BatchStatus::Active, dec("100")), &stat, &thresholds).unwrap();

        assert_eq!(alert.severity, AlertSeverity::Low);
        assert_eq!(
            alert.message,
            "Oil usage at 70.00% of target (70 / 100 units); Oil in use for 50.0 hours"
        );
    }

    #[test]
    fn test_quiet_batch_has_no_alert() {
        let stat = compute_usage_stat(dec("10"), dec("100"), added_at(), added_at() + Duration::hours(2));
        assert!(evaluate_alert(&batch(BatchStatus::Active, dec("100")), &stat, &AlertThresholds::default()).is_none());
    }

    #[test]
    fn test_sort_alerts_most_severe_first() {
        let thresholds = AlertThresholds::default();
        let now = added_at() + Duration::hours(1);
        let mut alerts: Vec<_> = [dec("65"), dec("130"), dec("85"), dec("110")]
            .into_iter()
            .filter_map(|total| {
                let stat = compute_usage_stat(total, dec("100"), added_at(), now);
                evaluate_alert(&batch(BatchStatus::Active, dec("100")), &stat, &thresholds)
            })
            .collect();

        sort_alerts(&mut alerts);

        let order: Vec<_> = alerts.iter().map(|a| a.current_usage).collect();
        assert_eq!(order, vec![dec("130"), dec("110"), dec("85"), dec("65")]);
        assert_eq!(alerts[0].severity, AlertSeverity::High);
        assert_eq!(alerts[3].severity, AlertSeverity::Low);
    }

    #[test]
    fn test_usage_bar_tiers() {
        assert_eq!(usage_bar_tier(dec("79.99")), UsageBarTier::Normal);
        assert_eq!(usage_bar_tier(dec("80")), UsageBarTier::Warning);
        assert_eq!(usage_bar_tier(dec("99.99")), UsageBarTier::Warning);
        assert_eq!(usage_bar_tier(dec("100")), UsageBarTier::Critical);
    }
}

// ============================================================================
// Property Tests
// ============================================================================

/// Target usage between 1 and 500 units
fn target_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..=500).prop_map(Decimal::from)
}

/// Elapsed minutes short of the medium time tier
fn quiet_minutes_strategy() -> impl Strategy<Value = i64> {
    0i64..(72 * 60)
}

#[cfg(test)]
mod property_tests {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        /// Usage at or past target is always high severity
        #[test]
        fn prop_usage_past_target_is_high(
            target in target_strategy(),
            over_pct in 0i64..400,
            minutes in 0i64..(200 * 60)
        ) {
            let total = target * Decimal::from(100 + over_pct) / Decimal::ONE_HUNDRED;
            let stat = compute_usage_stat(total, target, added_at(), added_at() + Duration::minutes(minutes));

            prop_assert!(stat.usage_percentage >= Decimal::ONE_HUNDRED);
            prop_assert_eq!(alert_severity(&stat, &AlertThresholds::default()), Some(AlertSeverity::High));
        }

        /// Usage in [80, 100) is medium when elapsed time has not reached a higher tier
        #[test]
        fn prop_usage_between_medium_and_high_is_medium(
            basis_points in 8000i64..10000,
            minutes in quiet_minutes_strategy()
        ) {
            let target = dec("100");
            let total = Decimal::new(basis_points, 2);
            let stat = compute_usage_stat(total, target, added_at(), added_at() + Duration::minutes(minutes));

            prop_assert_eq!(alert_severity(&stat, &AlertThresholds::default()), Some(AlertSeverity::Medium));
        }

        /// Severity never drops below the usage tier
        #[test]
        fn prop_time_only_escalates(
            target in target_strategy(),
            pct in 0i64..150,
            minutes in 0i64..(200 * 60)
        ) {
            let thresholds = AlertThresholds::default();
            let total = target * Decimal::from(pct) / Decimal::ONE_HUNDRED;
            let stat = compute_usage_stat(total, target, added_at(), added_at() + Duration::minutes(minutes));

            let severity = alert_severity(&stat, &thresholds);
            prop_assert!(severity >= thresholds.usage_severity(stat.usage_percentage));
            prop_assert!(severity >= thresholds.time_severity(stat.time_elapsed_hours));
        }

        /// The same inputs always give the same alert
        #[test]
        fn prop_evaluation_is_deterministic(
            target in target_strategy(),
            pct in 0i64..200,
            minutes in 0i64..(200 * 60)
        ) {
            let thresholds = AlertThresholds::default();
            let oil = batch(BatchStatus::Active, target);
            let total = target * Decimal::from(pct) / Decimal::ONE_HUNDRED;
            let now = added_at() + Duration::minutes(minutes);

            let first = evaluate_alert(&oil, &compute_usage_stat(total, target, added_at(), now), &thresholds);
            let second = evaluate_alert(&oil, &compute_usage_stat(total, target, added_at(), now), &thresholds);
            prop_assert_eq!(first, second);
        }

        /// Closed batches never alert, however far past target
        #[test]
        fn prop_closed_batch_never_alerts(
            target in target_strategy(),
            pct in 0i64..500,
            minutes in 0i64..(500 * 60)
        ) {
            let oil = batch(BatchStatus::Closed, target);
            let total = target * Decimal::from(pct) / Decimal::ONE_HUNDRED;
            let stat = compute_usage_stat(total, target, added_at(), added_at() + Duration::minutes(minutes));

            prop_assert!(evaluate_alert(&oil, &stat, &AlertThresholds::default()).is_none());
        }
    }
}
