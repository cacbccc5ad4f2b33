//! Menu category models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::validation::normalize_optional_text;

/// A menu category that products are filed under
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    /// Number of products currently assigned to this category
    pub product_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a category
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCategoryInput {
    #[validate(length(min = 1, max = 100, message = "Category name must be 1-100 characters"))]
    pub name: String,
    #[validate(length(max = 1000, message = "Description must be at most 1000 characters"))]
    pub description: Option<String>,
}

impl CreateCategoryInput {
    /// Trim the name and drop blank descriptions
    pub fn normalized(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            description: normalize_optional_text(self.description),
        }
    }
}

/// Input for updating a category; absent fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateCategoryInput {
    #[validate(length(min = 1, max = 100, message = "Category name must be 1-100 characters"))]
    pub name: Option<String>,
    #[validate(length(max = 1000, message = "Description must be at most 1000 characters"))]
    pub description: Option<String>,
}

impl UpdateCategoryInput {
    pub fn normalized(self) -> Self {
        Self {
            name: self.name.map(|n| n.trim().to_string()),
            description: self.description.map(|d| d.trim().to_string()),
        }
    }
}

/// Result of deleting a category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteCategoryResult {
    pub id: Uuid,
    /// Products whose category was cleared by the delete
    pub uncategorized_products: u64,
}
