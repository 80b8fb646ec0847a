//! Request handlers.

pub mod admin;
pub mod amenities;
pub mod auth;
pub mod health;
pub mod menu;
pub mod orders;
pub mod profile;
pub mod restaurants;
pub mod reviews;
pub mod tables;
