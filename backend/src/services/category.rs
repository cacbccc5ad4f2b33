//! Menu category service

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use shared::models::{Category, CreateCategoryInput, DeleteCategoryResult, UpdateCategoryInput};

/// Category service for CRUD over menu categories
#[derive(Clone)]
pub struct CategoryService {
    db: PgPool,
}

/// Row for category queries, with the product count joined in
#[derive(Debug, FromRow)]
struct CategoryRow {
    id: Uuid,
    name: String,
    description: Option<String>,
    product_count: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Category {
            id: row.id,
            name: row.name,
            description: row.description,
            product_count: row.product_count,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const SELECT_CATEGORY: &str = r#"
    SELECT c.id, c.name, c.description,
           COUNT(p.id) AS product_count,
           c.created_at, c.updated_at
    FROM categories c
    LEFT JOIN products p ON p.category_id = c.id
"#;

impl CategoryService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List categories by name
    pub async fn list_categories(&self) -> AppResult<Vec<Category>> {
        let rows = sqlx::query_as::<_, CategoryRow>(&format!(
            "{} GROUP BY c.id ORDER BY LOWER(c.name)",
            SELECT_CATEGORY
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Category::from).collect())
    }

    /// Get a category by ID
    pub async fn get_category(&self, category_id: Uuid) -> AppResult<Category> {
        let row = sqlx::query_as::<_, CategoryRow>(&format!(
            "{} WHERE c.id = $1 GROUP BY c.id",
            SELECT_CATEGORY
        ))
        .bind(category_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Category".to_string()))?;

        Ok(row.into())
    }

    /// Create a category; names are unique regardless of case
    pub async fn create_category(&self, input: CreateCategoryInput) -> AppResult<Category> {
        let input = input.normalized();
        input.validate()?;

        let category_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO categories (name, description)
            VALUES ($1, $2)
            RETURNING id
            "#,
        )
        .bind(&input.name)
        .bind(&input.description)
        .fetch_one(&self.db)
        .await
        .map_err(|e| AppError::from_unique_violation(e, "name"))?;

        tracing::info!(%category_id, name = %input.name, "Category created");

        self.get_category(category_id).await
    }

    /// Update a category. An empty description clears it.
    pub async fn update_category(
        &self,
        category_id: Uuid,
        input: UpdateCategoryInput,
    ) -> AppResult<Category> {
        let input = input.normalized();
        input.validate()?;

        let existing = self.get_category(category_id).await?;

        let name = input.name.unwrap_or(existing.name);
        let description = match input.description {
            Some(d) if d.is_empty() => None,
            Some(d) => Some(d),
            None => existing.description,
        };

        sqlx::query(
            r#"
            UPDATE categories
            SET name = $1, description = $2, updated_at = NOW()
            WHERE id = $3
            "#,
        )
        .bind(&name)
        .bind(&description)
        .bind(category_id)
        .execute(&self.db)
        .await
        .map_err(|e| AppError::from_unique_violation(e, "name"))?;

        self.get_category(category_id).await
    }

    /// Delete a category, leaving its products uncategorized
    pub async fn delete_category(&self, category_id: Uuid) -> AppResult<DeleteCategoryResult> {
        let mut tx = self.db.begin().await?;

        let uncategorized = sqlx::query(
            "UPDATE products SET category_id = NULL, updated_at = NOW() WHERE category_id = $1",
        )
        .bind(category_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        let deleted = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(category_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if deleted == 0 {
            return Err(AppError::NotFound("Category".to_string()));
        }

        tx.commit().await?;

        tracing::info!(
            %category_id,
            uncategorized_products = uncategorized,
            "Category deleted"
        );

        Ok(DeleteCategoryResult {
            id: category_id,
            uncategorized_products: uncategorized,
        })
    }
}
