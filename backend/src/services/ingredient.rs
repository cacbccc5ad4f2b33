//! Ingredient stock service for tracking purchases, consumption and balances

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use shared::models::{
    CreateIngredientInput, Ingredient, IngredientMovement, MovementResult, MovementType,
    RecordMovementInput, UpdateIngredientInput,
};
use shared::types::{PaginatedResponse, Pagination};
use shared::validation::{normalize_optional_text, validate_stock_quantity, validate_unit_cost};

/// Ingredient service
#[derive(Clone)]
pub struct IngredientService {
    db: PgPool,
}

/// Row for ingredient queries
#[derive(Debug, FromRow)]
struct IngredientRow {
    id: Uuid,
    name: String,
    unit: String,
    current_stock_quantity: Decimal,
    cost_per_unit: Option<Decimal>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<IngredientRow> for Ingredient {
    fn from(row: IngredientRow) -> Self {
        Ingredient {
            id: row.id,
            name: row.name,
            unit: row.unit,
            current_stock_quantity: row.current_stock_quantity,
            cost_per_unit: row.cost_per_unit,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Row for movement queries
#[derive(Debug, FromRow)]
struct MovementRow {
    id: Uuid,
    ingredient_id: Uuid,
    movement_type: String,
    quantity: Decimal,
    notes: Option<String>,
    created_by: Option<Uuid>,
    created_at: DateTime<Utc>,
}

impl TryFrom<MovementRow> for IngredientMovement {
    type Error = AppError;

    fn try_from(row: MovementRow) -> Result<Self, Self::Error> {
        let movement_type = MovementType::from_str(&row.movement_type).ok_or_else(|| {
            AppError::Internal(format!("Unknown movement type '{}'", row.movement_type))
        })?;

        Ok(IngredientMovement {
            id: row.id,
            ingredient_id: row.ingredient_id,
            movement_type,
            quantity: row.quantity,
            notes: row.notes,
            created_by: row.created_by,
            created_at: row.created_at,
        })
    }
}

const INGREDIENT_COLUMNS: &str =
    "id, name, unit, current_stock_quantity, cost_per_unit, created_at, updated_at";

fn validate_cost(cost: Option<Decimal>) -> AppResult<()> {
    match cost {
        Some(c) => validate_unit_cost(c).map_err(|msg| AppError::validation("cost_per_unit", msg)),
        None => Ok(()),
    }
}

fn validate_opening_stock(quantity: Option<Decimal>) -> AppResult<()> {
    match quantity {
        Some(q) => validate_stock_quantity(q)
            .map_err(|msg| AppError::validation("current_stock_quantity", msg)),
        None => Ok(()),
    }
}

impl IngredientService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List ingredients by name, optionally filtered by a name fragment
    pub async fn list_ingredients(&self, search: Option<&str>) -> AppResult<Vec<Ingredient>> {
        let pattern = search
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| format!("%{}%", s.replace('%', "\\%").replace('_', "\\_")));

        let rows = sqlx::query_as::<_, IngredientRow>(&format!(
            "SELECT {} FROM ingredients WHERE ($1::text IS NULL OR name ILIKE $1) ORDER BY LOWER(name)",
            INGREDIENT_COLUMNS
        ))
        .bind(pattern)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Ingredient::from).collect())
    }

    /// Get an ingredient by ID
    pub async fn get_ingredient(&self, ingredient_id: Uuid) -> AppResult<Ingredient> {
        sqlx::query_as::<_, IngredientRow>(&format!(
            "SELECT {} FROM ingredients WHERE id = $1",
            INGREDIENT_COLUMNS
        ))
        .bind(ingredient_id)
        .fetch_optional(&self.db)
        .await?
        .map(Ingredient::from)
        .ok_or_else(|| AppError::NotFound("Ingredient".to_string()))
    }

    /// Create an ingredient with an optional opening balance
    pub async fn create_ingredient(&self, input: CreateIngredientInput) -> AppResult<Ingredient> {
        let input = CreateIngredientInput {
            name: input.name.trim().to_string(),
            unit: input.unit.trim().to_string(),
            ..input
        };
        input.validate()?;
        validate_cost(input.cost_per_unit)?;
        validate_opening_stock(input.current_stock_quantity)?;

        let row = sqlx::query_as::<_, IngredientRow>(&format!(
            r#"
            INSERT INTO ingredients (name, unit, current_stock_quantity, cost_per_unit)
            VALUES ($1, $2, $3, $4)
            RETURNING {}
            "#,
            INGREDIENT_COLUMNS
        ))
        .bind(&input.name)
        .bind(&input.unit)
        .bind(input.current_stock_quantity.unwrap_or(Decimal::ZERO))
        .bind(input.cost_per_unit)
        .fetch_one(&self.db)
        .await
        .map_err(|e| AppError::from_unique_violation(e, "name"))?;

        tracing::info!(ingredient_id = %row.id, name = %row.name, "Ingredient created");
        Ok(row.into())
    }

    /// Update name, unit or cost. Stock only changes through movements.
    pub async fn update_ingredient(
        &self,
        ingredient_id: Uuid,
        input: UpdateIngredientInput,
    ) -> AppResult<Ingredient> {
        let input = UpdateIngredientInput {
            name: input.name.map(|n| n.trim().to_string()),
            unit: input.unit.map(|u| u.trim().to_string()),
            ..input
        };
        input.validate()?;
        validate_cost(input.cost_per_unit)?;

        let existing = self.get_ingredient(ingredient_id).await?;

        let row = sqlx::query_as::<_, IngredientRow>(&format!(
            r#"
            UPDATE ingredients
            SET name = $1, unit = $2, cost_per_unit = $3, updated_at = NOW()
            WHERE id = $4
            RETURNING {}
            "#,
            INGREDIENT_COLUMNS
        ))
        .bind(input.name.unwrap_or(existing.name))
        .bind(input.unit.unwrap_or(existing.unit))
        .bind(input.cost_per_unit.or(existing.cost_per_unit))
        .bind(ingredient_id)
        .fetch_one(&self.db)
        .await
        .map_err(|e| AppError::from_unique_violation(e, "name"))?;

        Ok(row.into())
    }

    /// Delete an ingredient with no recorded movements
    pub async fn delete_ingredient(&self, ingredient_id: Uuid) -> AppResult<()> {
        let has_movements = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM ingredient_movements WHERE ingredient_id = $1)",
        )
        .bind(ingredient_id)
        .fetch_one(&self.db)
        .await?;

        if has_movements {
            return Err(AppError::Conflict {
                resource: "ingredient".to_string(),
                message: "Ingredient has recorded stock movements".to_string(),
            });
        }

        let result = sqlx::query("DELETE FROM ingredients WHERE id = $1")
            .bind(ingredient_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Ingredient".to_string()));
        }

        tracing::info!(%ingredient_id, "Ingredient deleted");
        Ok(())
    }

    /// Record a stock movement and apply it to the balance
    pub async fn record_movement(
        &self,
        ingredient_id: Uuid,
        user_id: Uuid,
        input: RecordMovementInput,
    ) -> AppResult<MovementResult> {
        input.validate()?;
        input
            .movement_type
            .validate_quantity(input.quantity)
            .map_err(|msg| AppError::validation("quantity", msg))?;

        let delta = input.movement_type.stock_delta(input.quantity);

        let mut tx = self.db.begin().await?;

        let balance = sqlx::query_scalar::<_, Decimal>(
            r#"
            UPDATE ingredients
            SET current_stock_quantity = current_stock_quantity + $2, updated_at = NOW()
            WHERE id = $1
            RETURNING current_stock_quantity
            "#,
        )
        .bind(ingredient_id)
        .bind(delta)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| {
            AppError::from_numeric_overflow(e, "quantity", "Stock balance would exceed the supported range")
        })?
        .ok_or_else(|| AppError::NotFound("Ingredient".to_string()))?;

        let row = sqlx::query_as::<_, MovementRow>(
            r#"
            INSERT INTO ingredient_movements (ingredient_id, movement_type, quantity, notes, created_by)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, ingredient_id, movement_type, quantity, notes, created_by, created_at
            "#,
        )
        .bind(ingredient_id)
        .bind(input.movement_type.as_str())
        .bind(input.quantity)
        .bind(normalize_optional_text(input.notes))
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        if balance < Decimal::ZERO {
            tracing::warn!(%ingredient_id, %balance, "Ingredient stock is negative");
        }

        Ok(MovementResult {
            movement: row.try_into()?,
            current_stock_quantity: balance,
        })
    }

    /// Movements for an ingredient, newest first
    pub async fn list_movements(
        &self,
        ingredient_id: Uuid,
        pagination: &Pagination,
    ) -> AppResult<PaginatedResponse<IngredientMovement>> {
        self.get_ingredient(ingredient_id).await?;

        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM ingredient_movements WHERE ingredient_id = $1",
        )
        .bind(ingredient_id)
        .fetch_one(&self.db)
        .await?;

        let rows = sqlx::query_as::<_, MovementRow>(
            r#"
            SELECT id, ingredient_id, movement_type, quantity, notes, created_by, created_at
            FROM ingredient_movements
            WHERE ingredient_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(ingredient_id)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.db)
        .await?;

        let data = rows
            .into_iter()
            .map(IngredientMovement::try_from)
            .collect::<AppResult<Vec<_>>>()?;

        Ok(PaginatedResponse {
            data,
            pagination: pagination.meta(total.max(0) as u64),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cost_and_opening_stock_fit_their_columns() {
        assert!(validate_cost(None).is_ok());
        assert!(validate_cost(Some(Decimal::new(2550, 4))).is_ok());
        assert!(matches!(
            validate_cost(Some(Decimal::new(1, 5))),
            Err(AppError::Validation { field, .. }) if field == "cost_per_unit"
        ));
        assert!(validate_cost(Some(Decimal::from(-1))).is_err());

        assert!(validate_opening_stock(Some(Decimal::new(12500, 3))).is_ok());
        assert!(matches!(
            validate_opening_stock(Some(Decimal::new(4, 4))),
            Err(AppError::Validation { field, .. }) if field == "current_stock_quantity"
        ));
    }
}
