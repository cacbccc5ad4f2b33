//! Kitchen display tests
//!
//! Tests for order status transitions and the late flag

use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;

use shared::models::{elapsed_minutes, is_order_late, OrderStatus};

const ALL_STATUSES: [OrderStatus; 5] = [
    OrderStatus::Pending,
    OrderStatus::Preparing,
    OrderStatus::Ready,
    OrderStatus::Completed,
    OrderStatus::Cancelled,
];

fn rank(status: OrderStatus) -> u8 {
    match status {
        OrderStatus::Pending => 0,
        OrderStatus::Preparing => 1,
        OrderStatus::Ready => 2,
        OrderStatus::Completed => 3,
        OrderStatus::Cancelled => 4,
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_full_lifecycle() {
        let mut status = OrderStatus::Pending;
        for next in [OrderStatus::Preparing, OrderStatus::Ready, OrderStatus::Completed] {
            status = status.transition(next).unwrap();
        }
        assert_eq!(status, OrderStatus::Completed);
        assert!(status.is_terminal());
        assert!(!status.is_open());
    }

    #[test]
    fn test_cancellation_window() {
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Cancelled));
        assert!(OrderStatus::Preparing.can_transition_to(OrderStatus::Cancelled));
        assert!(!OrderStatus::Ready.can_transition_to(OrderStatus::Cancelled));
    }

    #[test]
    fn test_no_skipping_steps() {
        assert!(OrderStatus::Pending.transition(OrderStatus::Completed).is_err());
        assert!(OrderStatus::Preparing.transition(OrderStatus::Completed).is_err());
    }

    #[test]
    fn test_open_statuses() {
        let open: Vec<_> = ALL_STATUSES.iter().filter(|s| s.is_open()).collect();
        assert_eq!(open, vec![&OrderStatus::Pending, &OrderStatus::Preparing, &OrderStatus::Ready]);
    }

    #[test]
    fn test_status_wire_names() {
        for status in ALL_STATUSES {
            assert_eq!(OrderStatus::from_str(status.as_str()), Some(status));
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
        }
    }

    #[test]
    fn test_clock_skew_does_not_go_negative() {
        let created = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        assert_eq!(elapsed_minutes(created, created - Duration::minutes(3)), 0);
    }
}

// ============================================================================
// Property Tests
// ============================================================================

fn status_strategy() -> impl Strategy<Value = OrderStatus> {
    prop::sample::select(ALL_STATUSES.to_vec())
}

#[cfg(test)]
mod property_tests {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Allowed transitions only move forward
        #[test]
        fn prop_transitions_move_forward(from in status_strategy(), to in status_strategy()) {
            if from.can_transition_to(to) {
                prop_assert!(rank(to) > rank(from));
                prop_assert!(!from.is_terminal());
                prop_assert_eq!(from.transition(to), Ok(to));
            } else {
                prop_assert!(from.transition(to).is_err());
            }
        }

        /// Terminal orders accept nothing
        #[test]
        fn prop_terminal_accepts_nothing(to in status_strategy()) {
            prop_assert!(!OrderStatus::Completed.can_transition_to(to));
            prop_assert!(!OrderStatus::Cancelled.can_transition_to(to));
        }

        /// Ready, completed and cancelled orders are never late
        #[test]
        fn prop_only_waiting_orders_are_late(
            status in status_strategy(),
            elapsed in 0i64..600,
            limit in 1i64..120
        ) {
            let late = is_order_late(status, elapsed, limit);
            let waiting = matches!(status, OrderStatus::Pending | OrderStatus::Preparing);
            prop_assert_eq!(late, waiting && elapsed >= limit);
        }
    }
}
