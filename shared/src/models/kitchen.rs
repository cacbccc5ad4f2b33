//! Kitchen display order models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;
use validator::Validate;

/// How the order leaves the kitchen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderType {
    DineIn,
    Takeaway,
    Delivery,
}

impl OrderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderType::DineIn => "dine_in",
            OrderType::Takeaway => "takeaway",
            OrderType::Delivery => "delivery",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "dine_in" => Some(OrderType::DineIn),
            "takeaway" => Some(OrderType::Takeaway),
            "delivery" => Some(OrderType::Delivery),
            _ => None,
        }
    }
}

/// Preparation state of an order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Preparing,
    Ready,
    Completed,
    Cancelled,
}

impl OrderStatus {
    /// Statuses shown on the kitchen display
    pub const OPEN: [OrderStatus; 3] = [OrderStatus::Pending, OrderStatus::Preparing, OrderStatus::Ready];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Preparing => "preparing",
            OrderStatus::Ready => "ready",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(OrderStatus::Pending),
            "preparing" => Some(OrderStatus::Preparing),
            "ready" => Some(OrderStatus::Ready),
            "completed" => Some(OrderStatus::Completed),
            "cancelled" => Some(OrderStatus::Cancelled),
            _ => None,
        }
    }

    pub fn is_open(&self) -> bool {
        Self::OPEN.contains(self)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }

    /// Orders move one step forward; pending and preparing orders may be cancelled
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        matches!(
            (self, next),
            (OrderStatus::Pending, OrderStatus::Preparing)
                | (OrderStatus::Preparing, OrderStatus::Ready)
                | (OrderStatus::Ready, OrderStatus::Completed)
                | (OrderStatus::Pending, OrderStatus::Cancelled)
                | (OrderStatus::Preparing, OrderStatus::Cancelled)
        )
    }

    pub fn transition(self, next: OrderStatus) -> Result<OrderStatus, TransitionError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(TransitionError { from: self, to: next })
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rejected order status change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Cannot move order from {from} to {to}")]
pub struct TransitionError {
    pub from: OrderStatus,
    pub to: OrderStatus,
}

/// A line on a kitchen ticket
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KitchenOrderItem {
    pub id: Uuid,
    pub product_name: String,
    pub quantity: i32,
    pub notes: Option<String>,
}

/// An order as shown on the kitchen display
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KitchenOrder {
    pub id: Uuid,
    pub order_number: String,
    pub order_type: OrderType,
    pub table_label: Option<String>,
    pub status: OrderStatus,
    pub notes: Option<String>,
    pub items: Vec<KitchenOrderItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub elapsed_minutes: i64,
    pub is_late: bool,
}

/// Input for a ticket line
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateOrderItemInput {
    #[validate(length(min = 1, max = 200, message = "Product name must be 1-200 characters"))]
    pub product_name: String,
    #[validate(range(min = 1, max = 999, message = "Quantity must be between 1 and 999"))]
    pub quantity: i32,
    pub notes: Option<String>,
}

/// Input for pushing a new order to the kitchen
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateOrderInput {
    #[validate(length(min = 1, max = 30, message = "Order number must be 1-30 characters"))]
    pub order_number: String,
    pub order_type: OrderType,
    #[validate(length(max = 30, message = "Table label must be at most 30 characters"))]
    pub table_label: Option<String>,
    pub notes: Option<String>,
    #[validate(length(min = 1, message = "An order needs at least one item"))]
    pub items: Vec<CreateOrderItemInput>,
}

/// Input for moving an order to a new status
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateOrderStatusInput {
    pub status: OrderStatus,
}

/// Whole minutes between `created_at` and `now`, never negative
pub fn elapsed_minutes(created_at: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - created_at).num_minutes().max(0)
}

/// Orders still waiting on the kitchen past the limit are late; ready ones are not
pub fn is_order_late(status: OrderStatus, elapsed_minutes: i64, late_after_minutes: i64) -> bool {
    matches!(status, OrderStatus::Pending | OrderStatus::Preparing)
        && elapsed_minutes >= late_after_minutes
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_forward_transitions() {
        assert_eq!(
            OrderStatus::Pending.transition(OrderStatus::Preparing),
            Ok(OrderStatus::Preparing)
        );
        assert!(OrderStatus::Preparing.can_transition_to(OrderStatus::Ready));
        assert!(OrderStatus::Ready.can_transition_to(OrderStatus::Completed));
    }

    #[test]
    fn test_rejected_transitions() {
        let err = OrderStatus::Ready.transition(OrderStatus::Pending).unwrap_err();
        assert_eq!(err.to_string(), "Cannot move order from ready to pending");
        assert!(!OrderStatus::Pending.can_transition_to(OrderStatus::Ready));
        assert!(!OrderStatus::Ready.can_transition_to(OrderStatus::Cancelled));
        assert!(!OrderStatus::Completed.can_transition_to(OrderStatus::Cancelled));
    }

    #[test]
    fn test_elapsed_and_late() {
        let created = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let now = created + Duration::seconds(16 * 60 + 30);

        let elapsed = elapsed_minutes(created, now);
        assert_eq!(elapsed, 16);
        assert!(is_order_late(OrderStatus::Preparing, elapsed, 15));
        assert!(!is_order_late(OrderStatus::Ready, elapsed, 15));
        assert!(!is_order_late(OrderStatus::Pending, 14, 15));
    }

    #[test]
    fn test_create_order_requires_items() {
        let input = CreateOrderInput {
            order_number: "A-101".to_string(),
            order_type: OrderType::Takeaway,
            table_label: None,
            notes: None,
            items: vec![],
        };
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_create_order_with_items_validates() {
        let input = CreateOrderInput {
            order_number: "A-102".to_string(),
            order_type: OrderType::DineIn,
            table_label: Some("T4".to_string()),
            notes: None,
            items: vec![CreateOrderItemInput {
                product_name: "Fries".to_string(),
                quantity: 2,
                notes: None,
            }],
        };
        assert!(input.validate().is_ok());

        let errors = CreateOrderInput { items: vec![], ..input }.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("items"));
    }
}
