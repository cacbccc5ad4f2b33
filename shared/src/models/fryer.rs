//! Fryer and oil batch models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::alerts::{OilAlert, UsageBarTier, UsageStat};

/// A fryer station in the kitchen
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fryer {
    pub id: Uuid,
    pub name: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a fryer
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateFryerInput {
    #[validate(length(min = 1, max = 100, message = "Fryer name must be 1-100 characters"))]
    pub name: String,
    pub is_active: Option<bool>,
}

/// Input for updating a fryer
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateFryerInput {
    #[validate(length(min = 1, max = 100, message = "Fryer name must be 1-100 characters"))]
    pub name: Option<String>,
    pub is_active: Option<bool>,
}

/// Lifecycle of an oil batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    Active,
    Closed,
}

impl BatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BatchStatus::Active => "active",
            BatchStatus::Closed => "closed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "active" => Some(BatchStatus::Active),
            "closed" => Some(BatchStatus::Closed),
            _ => None,
        }
    }
}

impl std::fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A quantity of fryer oil tracked from addition until it is changed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OilBatch {
    pub id: Uuid,
    pub fryer_id: Uuid,
    pub fryer_name: String,
    pub batch_name: String,
    pub oil_added_at: DateTime<Utc>,
    /// Usage units after which the oil is due for a change
    pub target_usage_units: Decimal,
    pub status: BatchStatus,
    pub closed_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl OilBatch {
    pub fn is_active(&self) -> bool {
        self.status == BatchStatus::Active
    }
}

/// Input for starting a new oil batch on a fryer
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct StartBatchInput {
    #[validate(length(min = 1, max = 150, message = "Batch name must be 1-150 characters"))]
    pub batch_name: Option<String>,
    pub target_usage_units: Decimal,
    /// Defaults to the time of the request
    pub oil_added_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

/// Input for closing a batch
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CloseBatchInput {
    pub notes: Option<String>,
}

/// A usage record against an oil batch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OilUsageEntry {
    pub id: Uuid,
    pub batch_id: Uuid,
    pub units: Decimal,
    pub product_name: Option<String>,
    pub notes: Option<String>,
    pub recorded_at: DateTime<Utc>,
    pub recorded_by: Option<Uuid>,
}

/// Input for recording oil usage
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RecordUsageInput {
    pub units: Decimal,
    #[validate(length(max = 200, message = "Product name must be at most 200 characters"))]
    pub product_name: Option<String>,
    pub notes: Option<String>,
}

/// Batch together with its derived usage and alert state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchDetail {
    pub batch: OilBatch,
    pub usage: UsageStat,
    pub usage_bar: UsageBarTier,
    pub alert: Option<OilAlert>,
}

/// One row of the fryer dashboard
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FryerDashboardEntry {
    pub fryer: Fryer,
    /// The fryer's active batch, if oil has been added
    pub active_batch: Option<BatchDetail>,
}

/// Default batch name: fryer name plus the time the oil went in
pub fn default_batch_name(fryer_name: &str, oil_added_at: DateTime<Utc>) -> String {
    format!("{} {}", fryer_name, oil_added_at.format("%Y-%m-%d %H:%M"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_batch_status_round_trip() {
        for status in [BatchStatus::Active, BatchStatus::Closed] {
            assert_eq!(BatchStatus::from_str(status.as_str()), Some(status));
        }
        assert_eq!(BatchStatus::from_str("archived"), None);
    }

    #[test]
    fn test_default_batch_name() {
        let added = Utc.with_ymd_and_hms(2024, 3, 9, 7, 5, 0).unwrap();
        assert_eq!(default_batch_name("Fryer 1", added), "Fryer 1 2024-03-09 07:05");
    }
}
