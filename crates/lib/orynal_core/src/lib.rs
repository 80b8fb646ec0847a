//! # orynal_core
//!
//! Core domain logic for Orynal.

pub mod amenities;
pub mod auth;
pub mod menu;
pub mod migrate;
pub mod models;
pub mod orders;
pub mod params;
pub mod restaurants;
pub mod reviews;
pub mod store;
pub mod tables;
pub mod users;

mod sql;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
