use axum::{
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod models;
pub mod seed;

use crate::config::Config;

/// Shared application state. Cloning only clones the pool handle.
#[derive(Clone)]
pub struct AppState {
    pub db: sqlx::PgPool,
}

impl AppState {
    pub fn new(db: sqlx::PgPool) -> Self {
        Self { db }
    }
}

/// CORS policy: a single allowed origin when configured, permissive otherwise.
pub fn cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    match &config.cors_allowed_origin {
        Some(origin) => Ok(CorsLayer::new()
            .allow_origin(origin.parse::<HeaderValue>()?)
            .allow_methods(Any)
            .allow_headers(Any)),
        None => Ok(CorsLayer::permissive()),
    }
}

pub fn build_router(state: AppState, cors: CorsLayer) -> Router {
    Router::new()
        // ── Service ─────────────────────────────────────────────────────────
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))

        // ── Products CRUD ───────────────────────────────────────────────────
        .route(
            "/api/products",
            get(handlers::products::list_products).post(handlers::products::create_product),
        )
        .route(
            "/api/products/",
            get(handlers::products::list_products).post(handlers::products::create_product),
        )
        .route(
            "/api/products/:id",
            get(handlers::products::get_product)
                .put(handlers::products::update_product)
                .delete(handlers::products::delete_product),
        )

        // ── Inventory ───────────────────────────────────────────────────────
        .route(
            "/api/inventory/products/:id",
            get(handlers::inventory::get_product_inventory),
        )
        .route(
            "/api/inventory/products/:id/stock",
            post(handlers::inventory::add_stock).delete(handlers::inventory::remove_stock),
        )

        // ── Middleware ──────────────────────────────────────────────────────
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
