use std::time::Instant;

use axum::{
    extract::State,
    Json,
};
use serde_json::json;
use tracing::info;

use crate::{
    db,
    error::AppResult,
    extract::{AppJson, AppPath, AppQuery},
    models::{CreateProduct, ProductDetails, ProductFilters, UpdateProduct},
    AppState,
};

// ── List ──────────────────────────────────────────────────────────────────────

pub async fn list_products(
    State(state): State<AppState>,
    AppQuery(filters): AppQuery<ProductFilters>,
) -> AppResult<Json<Vec<ProductDetails>>> {
    let start = Instant::now();
    let products = db::fetch_all_products(&state.db, &filters).await?;

    info!(
        count = products.len(),
        elapsed_ms = start.elapsed().as_millis(),
        "Listed products"
    );

    Ok(Json(products))
}

// ── Create ────────────────────────────────────────────────────────────────────

pub async fn create_product(
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateProduct>,
) -> AppResult<Json<ProductDetails>> {
    payload.validate()?;

    let start = Instant::now();
    let product = db::insert_product(&state.db, &payload).await?;

    info!(
        id = product.product.id,
        name = %product.product.name,
        elapsed_ms = start.elapsed().as_millis(),
        "Created product"
    );

    Ok(Json(product))
}

// ── Get by ID ─────────────────────────────────────────────────────────────────

pub async fn get_product(
    State(state): State<AppState>,
    AppPath(id): AppPath<i32>,
) -> AppResult<Json<ProductDetails>> {
    let product = db::fetch_product_by_id(&state.db, id).await?;
    info!(id, "Fetched product");
    Ok(Json(product))
}

// ── Update ────────────────────────────────────────────────────────────────────

pub async fn update_product(
    State(state): State<AppState>,
    AppPath(id): AppPath<i32>,
    AppJson(payload): AppJson<UpdateProduct>,
) -> AppResult<Json<ProductDetails>> {
    payload.validate()?;

    let start = Instant::now();
    let product = db::update_product(&state.db, id, &payload).await?;

    info!(id, elapsed_ms = start.elapsed().as_millis(), "Updated product");

    Ok(Json(product))
}

// ── Delete ────────────────────────────────────────────────────────────────────

pub async fn delete_product(
    State(state): State<AppState>,
    AppPath(id): AppPath<i32>,
) -> AppResult<Json<serde_json::Value>> {
    let start = Instant::now();
    db::delete_product(&state.db, id).await?;

    info!(id, elapsed_ms = start.elapsed().as_millis(), "Deleted product");

    Ok(Json(json!({
        "message": "Product deleted",
        "id": id,
    })))
}
