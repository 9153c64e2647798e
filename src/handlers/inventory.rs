use axum::{
    extract::State,
    Json,
};
use tracing::info;

use crate::{
    db,
    error::AppResult,
    extract::{AppJson, AppPath},
    models::{Inventory, StockAdjusted, StockChange, StockUpdate},
    AppState,
};

pub async fn get_product_inventory(
    State(state): State<AppState>,
    AppPath(product_id): AppPath<i32>,
) -> AppResult<Json<Inventory>> {
    let inventory = db::fetch_inventory_by_product(&state.db, product_id).await?;
    Ok(Json(inventory))
}

pub async fn add_stock(
    State(state): State<AppState>,
    AppPath(product_id): AppPath<i32>,
    AppJson(payload): AppJson<StockUpdate>,
) -> AppResult<Json<StockAdjusted>> {
    payload.validate()?;
    adjust(&state, product_id, StockChange::Add(payload.quantity)).await
}

pub async fn remove_stock(
    State(state): State<AppState>,
    AppPath(product_id): AppPath<i32>,
    AppJson(payload): AppJson<StockUpdate>,
) -> AppResult<Json<StockAdjusted>> {
    payload.validate()?;
    adjust(&state, product_id, StockChange::Remove(payload.quantity)).await
}

async fn adjust(state: &AppState, product_id: i32, change: StockChange) -> AppResult<Json<StockAdjusted>> {
    let inventory = db::adjust_stock(&state.db, product_id, change).await?;

    info!(
        product_id,
        ?change,
        current_stock = inventory.quantity,
        "Adjusted stock"
    );

    Ok(Json(StockAdjusted {
        message: change.message(),
        current_stock: inventory.quantity,
    }))
}
