//! Restaurant review models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Review row joined with its author's display name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: i64,
    pub stars: i32,
    pub description: String,
    pub user_id: i64,
    pub user_name: String,
    pub restaurant_id: i64,
    pub created_at: DateTime<Utc>,
}

/// Body of a new review.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewInput {
    pub stars: i32,
    #[serde(default)]
    pub description: String,
}

/// Accepted star range, inclusive.
pub const STARS: std::ops::RangeInclusive<i32> = 1..=5;
