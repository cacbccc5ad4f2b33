//! Ingredient stock and usage ledger models

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::validation::validate_stock_quantity;

/// An ingredient with its current stock balance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ingredient {
    pub id: Uuid,
    pub name: String,
    /// Unit of measure, e.g. "kg", "l", "pcs"
    pub unit: String,
    /// Persisted balance; may be negative if consumption outran purchases
    pub current_stock_quantity: Decimal,
    pub cost_per_unit: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating an ingredient
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateIngredientInput {
    #[validate(length(min = 1, max = 150, message = "Ingredient name must be 1-150 characters"))]
    pub name: String,
    #[validate(length(min = 1, max = 20, message = "Unit must be 1-20 characters"))]
    pub unit: String,
    /// Opening balance, defaults to zero
    pub current_stock_quantity: Option<Decimal>,
    pub cost_per_unit: Option<Decimal>,
}

/// Input for updating an ingredient. Stock changes go through movements.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateIngredientInput {
    #[validate(length(min = 1, max = 150, message = "Ingredient name must be 1-150 characters"))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 20, message = "Unit must be 1-20 characters"))]
    pub unit: Option<String>,
    pub cost_per_unit: Option<Decimal>,
}

/// Kinds of stock movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementType {
    Purchase,
    Consumption,
    Waste,
    Adjustment,
}

impl MovementType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementType::Purchase => "purchase",
            MovementType::Consumption => "consumption",
            MovementType::Waste => "waste",
            MovementType::Adjustment => "adjustment",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "purchase" => Some(MovementType::Purchase),
            "consumption" => Some(MovementType::Consumption),
            "waste" => Some(MovementType::Waste),
            "adjustment" => Some(MovementType::Adjustment),
            _ => None,
        }
    }

    /// Check the quantity sign this movement type accepts and that it fits the ledger column
    pub fn validate_quantity(&self, quantity: Decimal) -> Result<(), &'static str> {
        match self {
            MovementType::Adjustment if quantity.is_zero() => {
                return Err("Adjustment quantity must not be zero")
            }
            MovementType::Adjustment => {}
            _ if quantity <= Decimal::ZERO => return Err("Quantity must be positive"),
            _ => {}
        }
        validate_stock_quantity(quantity)
    }

    /// Signed change this movement applies to the stock balance
    pub fn stock_delta(&self, quantity: Decimal) -> Decimal {
        match self {
            MovementType::Purchase | MovementType::Adjustment => quantity,
            MovementType::Consumption | MovementType::Waste => -quantity,
        }
    }
}

/// A recorded stock movement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngredientMovement {
    pub id: Uuid,
    pub ingredient_id: Uuid,
    pub movement_type: MovementType,
    pub quantity: Decimal,
    pub notes: Option<String>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Input for recording a stock movement
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RecordMovementInput {
    pub movement_type: MovementType,
    pub quantity: Decimal,
    #[validate(length(max = 500, message = "Notes must be at most 500 characters"))]
    pub notes: Option<String>,
}

/// Movement together with the resulting balance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovementResult {
    pub movement: IngredientMovement,
    pub current_stock_quantity: Decimal,
}

/// One row of the ingredient usage report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngredientUsageRow {
    pub ingredient_id: Uuid,
    pub ingredient_name: String,
    pub unit: String,
    /// Purchases inside the report range
    pub total_purchased: Decimal,
    /// Consumption inside the report range
    pub total_consumed: Decimal,
    /// Balance now, independent of the report range
    pub current_stock_quantity: Decimal,
}

/// Ingredient usage report for a resolved date range
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngredientUsageReport {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub rows: Vec<IngredientUsageRow>,
}
