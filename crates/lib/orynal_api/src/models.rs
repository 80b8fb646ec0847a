//! Request and response bodies specific to the HTTP layer.
//!
//! Domain rows from `orynal_core::models` are serialized as-is; this module
//! only adds envelopes and request shapes that have no core counterpart.

use orynal_core::models::restaurant::RestaurantInput;
use serde::{Deserialize, Serialize};

/// Error body returned by every failing request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

/// Success envelope `{status, message, data}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub status: u16,
    pub message: String,
    pub data: T,
}

impl<T> Envelope<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            status: 200,
            message: message.into(),
            data,
        }
    }

    pub fn created(message: impl Into<String>, data: T) -> Self {
        Self {
            status: 201,
            message: message.into(),
            data,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// ID of a freshly created row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Created {
    pub id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

/// Admin-side account creation. The role is always owner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOwnerRequest {
    pub name: String,
    #[serde(default)]
    pub surname: String,
    pub email: String,
    pub phone: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRestaurantRequest {
    pub owner_id: i64,
    #[serde(flatten)]
    pub restaurant: RestaurantInput,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub version: String,
    pub db_connected: bool,
}
