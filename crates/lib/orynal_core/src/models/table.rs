//! Restaurant table models.

use serde::{Deserialize, Serialize};

/// Table row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub kind: String,
    pub description: String,
    pub capacity: i32,
    pub restaurant_id: i64,
}

/// Editable table fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableInput {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub description: String,
    pub capacity: i32,
}
