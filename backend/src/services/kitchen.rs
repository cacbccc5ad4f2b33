//! Kitchen display service for order tickets and their preparation status

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use shared::models::{
    elapsed_minutes, is_order_late, CreateOrderInput, KitchenOrder, KitchenOrderItem, OrderStatus,
    OrderType,
};
use shared::validation::normalize_optional_text;

/// Kitchen order service
#[derive(Clone)]
pub struct KitchenService {
    db: PgPool,
    late_after_minutes: i64,
}

#[derive(Debug, FromRow)]
struct OrderRow {
    id: Uuid,
    order_number: String,
    order_type: String,
    table_label: Option<String>,
    status: String,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct ItemRow {
    id: Uuid,
    order_id: Uuid,
    product_name: String,
    quantity: i32,
    notes: Option<String>,
}

impl From<ItemRow> for KitchenOrderItem {
    fn from(row: ItemRow) -> Self {
        KitchenOrderItem {
            id: row.id,
            product_name: row.product_name,
            quantity: row.quantity,
            notes: row.notes,
        }
    }
}

fn parse_status(raw: &str) -> AppResult<OrderStatus> {
    OrderStatus::from_str(raw)
        .ok_or_else(|| AppError::Internal(format!("Unknown order status '{}'", raw)))
}

const ORDER_COLUMNS: &str =
    "id, order_number, order_type, table_label, status, notes, created_at, updated_at";

impl KitchenService {
    pub fn new(db: PgPool, late_after_minutes: i64) -> Self {
        Self {
            db,
            late_after_minutes,
        }
    }

    fn to_order(
        &self,
        row: OrderRow,
        items: Vec<KitchenOrderItem>,
        now: DateTime<Utc>,
    ) -> AppResult<KitchenOrder> {
        let status = parse_status(&row.status)?;
        let order_type = OrderType::from_str(&row.order_type).ok_or_else(|| {
            AppError::Internal(format!("Unknown order type '{}'", row.order_type))
        })?;
        let elapsed = elapsed_minutes(row.created_at, now);

        Ok(KitchenOrder {
            id: row.id,
            order_number: row.order_number,
            order_type,
            table_label: row.table_label,
            status,
            notes: row.notes,
            items,
            created_at: row.created_at,
            updated_at: row.updated_at,
            elapsed_minutes: elapsed,
            is_late: is_order_late(status, elapsed, self.late_after_minutes),
        })
    }

    /// Load items for a set of orders, grouped by order ID
    async fn items_for(&self, order_ids: &[Uuid]) -> AppResult<HashMap<Uuid, Vec<KitchenOrderItem>>> {
        let rows = sqlx::query_as::<_, ItemRow>(
            r#"
            SELECT id, order_id, product_name, quantity, notes
            FROM kitchen_order_items
            WHERE order_id = ANY($1)
            ORDER BY position
            "#,
        )
        .bind(order_ids)
        .fetch_all(&self.db)
        .await?;

        let mut grouped: HashMap<Uuid, Vec<KitchenOrderItem>> = HashMap::new();
        for row in rows {
            grouped.entry(row.order_id).or_default().push(row.into());
        }
        Ok(grouped)
    }

    /// Push a new order to the kitchen
    pub async fn create_order(&self, input: CreateOrderInput) -> AppResult<KitchenOrder> {
        let input = CreateOrderInput {
            order_number: input.order_number.trim().to_string(),
            table_label: normalize_optional_text(input.table_label),
            notes: normalize_optional_text(input.notes),
            ..input
        };
        input.validate()?;
        for item in &input.items {
            item.validate()?;
            if item.product_name.trim().is_empty() {
                return Err(AppError::validation("items", "Product name is required"));
            }
        }

        let mut tx = self.db.begin().await?;

        let order_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO kitchen_orders (order_number, order_type, table_label, status, notes)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(&input.order_number)
        .bind(input.order_type.as_str())
        .bind(&input.table_label)
        .bind(OrderStatus::Pending.as_str())
        .bind(&input.notes)
        .fetch_one(&mut *tx)
        .await?;

        for (position, item) in input.items.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO kitchen_order_items (order_id, position, product_name, quantity, notes)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(order_id)
            .bind(position as i32)
            .bind(item.product_name.trim())
            .bind(item.quantity)
            .bind(normalize_optional_text(item.notes.clone()))
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        tracing::info!(
            %order_id,
            order_number = %input.order_number,
            items = input.items.len(),
            "Kitchen order created"
        );

        self.get_order(order_id).await
    }

    /// Orders still on the display, oldest first
    pub async fn list_open_orders(&self, status: Option<OrderStatus>) -> AppResult<Vec<KitchenOrder>> {
        let statuses: Vec<&str> = match status {
            Some(s) if s.is_open() => vec![s.as_str()],
            Some(s) => {
                return Err(AppError::validation(
                    "status",
                    format!("'{}' orders are not shown on the kitchen display", s),
                ))
            }
            None => OrderStatus::OPEN.iter().map(|s| s.as_str()).collect(),
        };

        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {} FROM kitchen_orders WHERE status = ANY($1) ORDER BY created_at ASC",
            ORDER_COLUMNS
        ))
        .bind(statuses)
        .fetch_all(&self.db)
        .await?;

        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let mut items = self.items_for(&ids).await?;
        let now = Utc::now();

        rows.into_iter()
            .map(|row| {
                let order_items = items.remove(&row.id).unwrap_or_default();
                self.to_order(row, order_items, now)
            })
            .collect()
    }

    /// Get an order by ID
    pub async fn get_order(&self, order_id: Uuid) -> AppResult<KitchenOrder> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {} FROM kitchen_orders WHERE id = $1",
            ORDER_COLUMNS
        ))
        .bind(order_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Kitchen order".to_string()))?;

        let items = self
            .items_for(&[order_id])
            .await?
            .remove(&order_id)
            .unwrap_or_default();

        self.to_order(row, items, Utc::now())
    }

    /// Move an order to its next status
    pub async fn update_status(&self, order_id: Uuid, next: OrderStatus) -> AppResult<KitchenOrder> {
        let mut tx = self.db.begin().await?;

        let current = sqlx::query_scalar::<_, String>(
            "SELECT status FROM kitchen_orders WHERE id = $1 FOR UPDATE",
        )
        .bind(order_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Kitchen order".to_string()))?;

        let current = parse_status(&current)?;
        let next = current.transition(next)?;

        sqlx::query("UPDATE kitchen_orders SET status = $1, updated_at = NOW() WHERE id = $2")
            .bind(next.as_str())
            .bind(order_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(%order_id, from = %current, to = %next, "Kitchen order status changed");

        self.get_order(order_id).await
    }
}
