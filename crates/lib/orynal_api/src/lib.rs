//! # orynal_api
//!
//! HTTP API library for Orynal.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use std::sync::Arc;

use axum::Router;
use axum::middleware::from_fn_with_state;
use axum::routing::{MethodRouter, delete, get, post, put};
use orynal_core::auth::SessionIssuer;
use orynal_core::models::auth::Role;
use orynal_core::store::{IdentityStore, PgStore, RestaurantStore, SessionStore};
use sqlx::PgPool;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::ApiConfig;
use crate::handlers::{
    admin, amenities, auth, health, menu, orders, profile, restaurants, reviews, tables,
};

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// PostgreSQL connection pool.
    pub pool: PgPool,
    /// API configuration.
    pub config: ApiConfig,
    pub identities: Arc<dyn IdentityStore>,
    pub sessions: Arc<dyn SessionStore>,
    /// Backs the ownership gate.
    pub restaurants: Arc<dyn RestaurantStore>,
}

impl AppState {
    /// State with every store backed by `pool`.
    pub fn new(pool: PgPool, config: ApiConfig) -> Self {
        let store = Arc::new(PgStore::new(pool.clone()));
        Self {
            pool,
            config,
            identities: store.clone(),
            sessions: store.clone(),
            restaurants: store,
        }
    }

    /// State with explicit stores, e.g. a shared `MemoryStore` in tests.
    pub fn with_stores(
        pool: PgPool,
        config: ApiConfig,
        identities: Arc<dyn IdentityStore>,
        sessions: Arc<dyn SessionStore>,
        restaurants: Arc<dyn RestaurantStore>,
    ) -> Self {
        Self {
            pool,
            config,
            identities,
            sessions,
            restaurants,
        }
    }

    /// Session issuer over this state's stores and signing secret.
    pub fn issuer(&self) -> SessionIssuer<'_> {
        SessionIssuer::new(
            self.identities.as_ref(),
            self.sessions.as_ref(),
            self.config.secret_bytes(),
        )
    }
}

/// Run embedded database migrations.
///
/// Delegates to `orynal_core::migrate::migrate()` which owns the migration files.
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    orynal_core::migrate::migrate(pool).await
}

// ---------------------------------------------------------------------------
// Route guards
// ---------------------------------------------------------------------------

/// Require a valid access token on every method of `methods`.
fn authenticated(
    state: &AppState,
    methods: MethodRouter<AppState>,
) -> MethodRouter<AppState> {
    methods.route_layer(from_fn_with_state(
        state.clone(),
        middleware::auth::validate_auth,
    ))
}

/// Require a valid access token carrying `role`.
///
/// The role gate is added first so the token check wraps it and runs first.
fn with_role(
    state: &AppState,
    role: Role,
    methods: MethodRouter<AppState>,
) -> MethodRouter<AppState> {
    authenticated(
        state,
        methods.route_layer(from_fn_with_state(role, middleware::role::require_role)),
    )
}

/// Resolve an optional identity without rejecting undecodable tokens.
fn tolerant(state: &AppState, methods: MethodRouter<AppState>) -> MethodRouter<AppState> {
    methods.route_layer(from_fn_with_state(
        state.clone(),
        middleware::auth::role_to_ctx,
    ))
}

fn amenity_catalog() -> MethodRouter<AppState> {
    get(amenities::list_amenities).post(amenities::create_amenity)
}

fn amenity_entry() -> MethodRouter<AppState> {
    put(amenities::update_amenity).delete(amenities::delete_amenity)
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Builds the Axum router with all routes and shared state.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let admin = Router::new()
        .route(
            routes::ADMIN_OWNERS,
            get(admin::list_owners).post(admin::create_owner),
        )
        .route(routes::ADMIN_OWNER, delete(admin::delete_owner))
        .route(routes::ADMIN_CLIENTS, get(admin::list_clients))
        .route(routes::ADMIN_CLIENT, delete(admin::delete_client))
        .route(
            routes::ADMIN_RESTAURANTS,
            get(admin::list_restaurants).post(admin::create_restaurant),
        )
        .route(
            routes::ADMIN_RESTAURANT,
            get(admin::get_restaurant)
                .put(admin::update_restaurant)
                .delete(admin::delete_restaurant),
        )
        // The amenity catalog is reachable from both admin prefixes.
        .route(routes::ADMIN_SERVICES, amenity_catalog())
        .route(routes::ADMIN_SERVICE, amenity_entry())
        .route(routes::ADMIN_RESTAURANT_SERVICES, amenity_catalog())
        .route(routes::ADMIN_RESTAURANT_SERVICE, amenity_entry())
        .route_layer(from_fn_with_state(Role::Admin, middleware::role::require_role))
        .route_layer(from_fn_with_state(
            state.clone(),
            middleware::auth::validate_auth,
        ));

    Router::new()
        .route(routes::HEALTH, get(health::health))
        // Auth
        .route(routes::AUTH_LOGIN, post(auth::login))
        .route(routes::AUTH_REGISTER, post(auth::register))
        .route(routes::AUTH_REFRESH, post(auth::refresh_token))
        // Profile
        .route(
            routes::PROFILE,
            authenticated(
                &state,
                get(profile::get_profile)
                    .put(profile::update_profile)
                    .delete(profile::delete_profile),
            ),
        )
        .route(
            routes::PROFILE_CHANGE_PASSWORD,
            authenticated(&state, put(profile::change_password)),
        )
        // Restaurants
        .route(
            routes::RESTAURANTS,
            tolerant(&state, get(restaurants::list_restaurants)),
        )
        .route(routes::RESTAURANTS_STATISTICS, get(restaurants::statistics))
        .route(routes::RESTAURANTS_POPULAR, get(restaurants::popular))
        .route(routes::RESTAURANTS_SERVICES, get(amenities::list_amenities))
        .route(
            routes::RESTAURANT,
            get(restaurants::get_restaurant).merge(authenticated(
                &state,
                put(restaurants::update_restaurant).delete(restaurants::delete_restaurant),
            )),
        )
        .route(
            routes::RESTAURANT_ORDERS,
            with_role(&state, Role::Owner, get(restaurants::list_orders)),
        )
        // Tables
        .route(routes::TABLE_CATEGORIES, get(tables::categories))
        .route(
            routes::TABLES,
            get(tables::list_tables).merge(with_role(
                &state,
                Role::Owner,
                post(tables::create_table),
            )),
        )
        .route(
            routes::TABLE,
            get(tables::get_table).merge(with_role(
                &state,
                Role::Owner,
                put(tables::update_table).delete(tables::delete_table),
            )),
        )
        // Menu
        .route(routes::MENU_CATEGORIES, get(menu::categories))
        .route(
            routes::MENU,
            get(menu::list_foods).merge(with_role(&state, Role::Owner, post(menu::create_food))),
        )
        .route(
            routes::MENU_ITEM,
            get(menu::get_food).merge(with_role(
                &state,
                Role::Owner,
                put(menu::update_food).delete(menu::delete_food),
            )),
        )
        // Reviews
        .route(
            routes::REVIEWS,
            get(reviews::list_reviews).merge(with_role(
                &state,
                Role::User,
                post(reviews::create_review),
            )),
        )
        .route(
            routes::REVIEW,
            with_role(&state, Role::User, delete(reviews::delete_review)),
        )
        // Orders
        .route(routes::ORDERS, authenticated(&state, get(orders::list_orders)))
        .route(
            routes::ORDERS_CREATE,
            authenticated(&state, post(orders::create_order)),
        )
        .route(
            routes::ORDER,
            authenticated(
                &state,
                get(orders::get_order)
                    .put(orders::update_order)
                    .delete(orders::delete_order),
            ),
        )
        .nest(routes::ADMIN, admin)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
