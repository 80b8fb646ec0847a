//! Amenity models.

use serde::{Deserialize, Serialize};

/// An entry of the site-wide amenity catalog (wifi, parking, live music...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Amenity {
    pub id: i64,
    pub name: String,
}

/// Body of an amenity create or rename.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmenityInput {
    pub name: String,
}
