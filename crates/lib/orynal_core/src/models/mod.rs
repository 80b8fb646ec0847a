//! Domain models shared by the store and the HTTP layer.

pub mod amenity;
pub mod auth;
pub mod list;
pub mod menu;
pub mod order;
pub mod restaurant;
pub mod review;
pub mod table;
