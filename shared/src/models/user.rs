//! Staff users and capabilities

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Capability strings carried in access tokens, as `resource:action`
pub mod capability {
    pub const CATEGORIES_VIEW: &str = "categories:view";
    pub const CATEGORIES_MANAGE: &str = "categories:manage";
    pub const FRYERS_VIEW: &str = "fryers:view";
    pub const FRYERS_MANAGE: &str = "fryers:manage";
    pub const INGREDIENTS_VIEW: &str = "ingredients:view";
    pub const INGREDIENTS_MANAGE: &str = "ingredients:manage";
    pub const KITCHEN_VIEW: &str = "kitchen:view";
    pub const KITCHEN_MANAGE: &str = "kitchen:manage";
    pub const REPORTS_VIEW: &str = "reports:view";

    /// Every capability; granted to the bootstrap administrator
    pub const ALL: [&str; 9] = [
        CATEGORIES_VIEW,
        CATEGORIES_MANAGE,
        FRYERS_VIEW,
        FRYERS_MANAGE,
        INGREDIENTS_VIEW,
        INGREDIENTS_MANAGE,
        KITCHEN_VIEW,
        KITCHEN_MANAGE,
        REPORTS_VIEW,
    ];
}

/// Public profile of a staff user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaffUser {
    pub id: Uuid,
    pub email: String,
    pub display_name: String,
    pub capabilities: Vec<String>,
}
