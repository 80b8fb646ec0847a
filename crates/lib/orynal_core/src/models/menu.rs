//! Menu (food) models.

use serde::{Deserialize, Serialize};

/// Menu item row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Food {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub kind: String,
    pub description: String,
    pub price: f64,
    pub available: bool,
    pub restaurant_id: i64,
}

/// Editable menu item fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoodInput {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    #[serde(default = "available_by_default")]
    pub available: bool,
}

fn available_by_default() -> bool {
    true
}
