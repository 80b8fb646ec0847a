//! Business rules that sit between handlers and `orynal_core` queries.

pub mod orders;
pub mod ownership;
pub mod restaurants;
pub mod users;
