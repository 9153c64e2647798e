pub mod inventory;
pub mod products;

use axum::{http::StatusCode, Json};
use serde_json::json;

pub async fn root() -> Json<serde_json::Value> {
    Json(json!({ "message": "Welcome to Inventory Management System API" }))
}

pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (StatusCode::OK, Json(json!({ "status": "ok", "service": "inventory-api" })))
}
