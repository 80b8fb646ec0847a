//! Order models.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lifecycle of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Canceled,
    Completed,
}

/// An order status string outside the known set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown order status: {0}")]
pub struct UnknownOrderStatus(pub String);

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Canceled => "canceled",
            OrderStatus::Completed => "completed",
        }
    }

    /// Canceled and completed orders are frozen for the guest who placed them.
    pub fn is_final(&self) -> bool {
        matches!(self, OrderStatus::Canceled | OrderStatus::Completed)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = UnknownOrderStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(OrderStatus::Pending),
            "confirmed" => Ok(OrderStatus::Confirmed),
            "canceled" => Ok(OrderStatus::Canceled),
            "completed" => Ok(OrderStatus::Completed),
            other => Err(UnknownOrderStatus(other.to_string())),
        }
    }
}

impl TryFrom<String> for OrderStatus {
    type Error = UnknownOrderStatus;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Order row. `foods` is filled from `order_foods` on single-order reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: i64,
    pub restaurant_id: i64,
    pub table_id: i64,
    pub user_id: i64,
    pub total_sum: f64,
    pub date: NaiveDateTime,
    #[sqlx(try_from = "String")]
    pub status: OrderStatus,
    #[sqlx(skip)]
    #[serde(default)]
    pub foods: Vec<i64>,
}

/// Body of an order placement. The guest comes from the auth context.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    pub restaurant_id: i64,
    pub table_id: i64,
    pub total_sum: f64,
    pub date: NaiveDateTime,
    #[serde(default)]
    pub foods: Vec<i64>,
}

/// Partial order update; absent fields keep their stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderUpdate {
    pub table_id: Option<i64>,
    pub total_sum: Option<f64>,
    pub date: Option<NaiveDateTime>,
    pub status: Option<OrderStatus>,
}
