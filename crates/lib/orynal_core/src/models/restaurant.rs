//! Restaurant models.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use super::amenity::Amenity;

/// Restaurant row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Restaurant {
    pub id: i64,
    pub name: String,
    pub address: String,
    pub description: String,
    pub city: String,
    /// Whether the restaurant is currently accepting guests.
    pub status: bool,
    pub phone: String,
    pub mode_from: NaiveTime,
    pub mode_to: NaiveTime,
    pub owner_id: i64,
    /// Linked amenities, exposed as `services`.
    #[sqlx(skip)]
    #[serde(rename = "services", default)]
    pub amenities: Vec<Amenity>,
}

/// Editable restaurant fields. The owner is fixed at creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantInput {
    pub name: String,
    pub address: String,
    #[serde(default)]
    pub description: String,
    pub city: String,
    #[serde(default)]
    pub status: bool,
    pub phone: String,
    pub mode_from: NaiveTime,
    pub mode_to: NaiveTime,
    /// Amenity IDs to link. `None` leaves the current links alone.
    #[serde(rename = "serviceIds", default)]
    pub amenity_ids: Option<Vec<i64>>,
}

impl RestaurantInput {
    /// Requested amenity IDs, sorted and deduplicated.
    pub fn unique_amenity_ids(&self) -> Option<Vec<i64>> {
        self.amenity_ids.as_ref().map(|ids| {
            let mut ids = ids.clone();
            ids.sort_unstable();
            ids.dedup();
            ids
        })
    }
}

/// The slice of a restaurant the ownership gate needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::FromRow)]
pub struct RestaurantRef {
    pub id: i64,
    pub owner_id: i64,
}

/// Site-wide counters shown on the landing page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    pub reserved_count: i64,
    pub people_count: i64,
    pub restaurants_count: i64,
}

/// Average party size used to estimate `people_count` from order count.
pub const PEOPLE_PER_ORDER: i64 = 5;

impl Statistics {
    pub fn from_counts(orders: i64, restaurants: i64) -> Self {
        Self {
            reserved_count: orders,
            people_count: orders * PEOPLE_PER_ORDER,
            restaurants_count: restaurants,
        }
    }
}

/// A restaurant together with how many orders it has received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PopularRestaurant {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub restaurant: Restaurant,
    pub orders_count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statistics_estimate_people_from_orders() {
        let stats = Statistics::from_counts(7, 3);
        assert_eq!(stats.reserved_count, 7);
        assert_eq!(stats.people_count, 35);
        assert_eq!(stats.restaurants_count, 3);
    }

    #[test]
    fn restaurant_input_accepts_clock_times() {
        let input: RestaurantInput = serde_json::from_value(serde_json::json!({
            "name": "Plov Center",
            "address": "Amir Temur 1",
            "city": "Tashkent",
            "phone": "+998901234567",
            "modeFrom": "09:00:00",
            "modeTo": "23:30:00"
        }))
        .unwrap();
        assert_eq!(input.mode_from, NaiveTime::from_hms_opt(9, 0, 0).unwrap());
        assert!(!input.status);
        assert!(input.description.is_empty());
        assert!(input.amenity_ids.is_none());
    }

    #[test]
    fn amenity_ids_are_deduplicated() {
        let input: RestaurantInput = serde_json::from_value(serde_json::json!({
            "name": "Plov Center",
            "address": "Amir Temur 1",
            "city": "Tashkent",
            "phone": "+998901234567",
            "modeFrom": "09:00:00",
            "modeTo": "23:30:00",
            "serviceIds": [3, 1, 3]
        }))
        .unwrap();
        assert_eq!(input.unique_amenity_ids(), Some(vec![1, 3]));
    }
}
