//! Route paths, shared by the router and the integration tests.

pub const HEALTH: &str = "/api/health";

pub const AUTH_LOGIN: &str = "/api/auth/login";
pub const AUTH_REGISTER: &str = "/api/auth/register";
pub const AUTH_REFRESH: &str = "/api/auth/refresh-token";

pub const PROFILE: &str = "/api/profile";
pub const PROFILE_CHANGE_PASSWORD: &str = "/api/profile/change-password";

/// Prefix the admin router is nested under.
pub const ADMIN: &str = "/api/admin";
pub const ADMIN_OWNERS: &str = "/owners";
pub const ADMIN_OWNER: &str = "/owners/{id}";
pub const ADMIN_CLIENTS: &str = "/clients";
pub const ADMIN_CLIENT: &str = "/clients/{id}";
pub const ADMIN_RESTAURANTS: &str = "/restaurants";
pub const ADMIN_RESTAURANT: &str = "/restaurants/{id}";
pub const ADMIN_SERVICES: &str = "/services";
pub const ADMIN_SERVICE: &str = "/services/{id}";
pub const ADMIN_RESTAURANT_SERVICES: &str = "/restaurants/services";
pub const ADMIN_RESTAURANT_SERVICE: &str = "/restaurants/services/{id}";

pub const RESTAURANTS: &str = "/api/restaurants";
pub const RESTAURANTS_STATISTICS: &str = "/api/restaurants/statistics";
pub const RESTAURANTS_POPULAR: &str = "/api/restaurants/popular";
pub const RESTAURANTS_SERVICES: &str = "/api/restaurants/services";
pub const RESTAURANT: &str = "/api/restaurants/{id}";
pub const RESTAURANT_ORDERS: &str = "/api/restaurants/{id}/orders";

pub const TABLES: &str = "/api/restaurants/{id}/tables";
pub const TABLE_CATEGORIES: &str = "/api/restaurants/{id}/tables/categories";
pub const TABLE: &str = "/api/restaurants/{id}/tables/{table_id}";

pub const MENU: &str = "/api/restaurants/{id}/menu";
pub const MENU_CATEGORIES: &str = "/api/restaurants/{id}/menu/categories";
pub const MENU_ITEM: &str = "/api/restaurants/{id}/menu/{food_id}";

pub const REVIEWS: &str = "/api/restaurants/{id}/reviews";
pub const REVIEW: &str = "/api/restaurants/{id}/reviews/{review_id}";

pub const ORDERS: &str = "/api/orders";
pub const ORDERS_CREATE: &str = "/api/orders/create";
pub const ORDER: &str = "/api/orders/{id}";
