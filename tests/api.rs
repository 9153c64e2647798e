//! HTTP-level tests against a real Postgres. Each test gets a fresh database
//! with migrations applied. Needs `DATABASE_URL`; run with
//! `cargo test -- --ignored`.

use std::time::Duration;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use sqlx::PgPool;
use tower::ServiceExt;
use tower_http::cors::CorsLayer;

use inventory_api::{
    build_router, db,
    models::{Inventory, ProductDetails, StockAdjusted, StockChange},
    seed, AppState,
};

fn app(pool: PgPool) -> Router {
    build_router(AppState::new(pool), CorsLayer::permissive())
}

fn typed<T: DeserializeOwned>(body: Value) -> T {
    serde_json::from_value(body).expect("response should match the model")
}

/// Keep consecutive writes apart so timestamp comparisons are strict.
async fn tick() {
    tokio::time::sleep(Duration::from_millis(20)).await;
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn create_test_product(app: &Router) -> Value {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/products/",
        Some(json!({ "name": "Test Product", "description": "Test Description", "price": 99.99 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body
}

// ── Products ──────────────────────────────────────────────────────────────────

#[sqlx::test]
#[ignore = "requires a Postgres DATABASE_URL"]
async fn create_then_get_returns_same_fields(pool: PgPool) {
    let app = app(pool);
    let created = create_test_product(&app).await;
    assert_eq!(created["name"], "Test Product");
    assert_eq!(created["description"], "Test Description");
    assert_eq!(created["price"], 99.99);
    let id = created["id"].as_i64().expect("generated id");

    let (status, fetched) = send(&app, Method::GET, &format!("/api/products/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["id"], created["id"]);
    assert_eq!(fetched["name"], "Test Product");
    assert_eq!(fetched["inventory"]["quantity"], 0);
}

#[sqlx::test]
#[ignore = "requires a Postgres DATABASE_URL"]
async fn create_rejects_negative_price(pool: PgPool) {
    let app = app(pool);
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/products/",
        Some(json!({ "name": "Bad", "description": "Negative", "price": -1.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "price must be >= 0");
}

#[sqlx::test]
#[ignore = "requires a Postgres DATABASE_URL"]
async fn partial_update_changes_only_supplied_fields(pool: PgPool) {
    let app = app(pool);
    let created: ProductDetails = typed(create_test_product(&app).await);
    let id = created.product.id;

    tick().await;
    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/api/products/{id}"),
        Some(json!({ "price": 199.99 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let updated: ProductDetails = typed(body);
    assert_eq!(updated.product.name, "Test Product");
    assert_eq!(updated.product.description, "Test Description");
    assert_eq!(updated.product.price, 199.99);
    assert_eq!(updated.product.created_at, created.product.created_at);
    assert!(updated.product.updated_at > created.product.updated_at);
    assert_eq!(updated.inventory, created.inventory);
}

#[sqlx::test]
#[ignore = "requires a Postgres DATABASE_URL"]
async fn update_missing_product_is_404(pool: PgPool) {
    let app = app(pool);
    let (status, _) = send(
        &app,
        Method::PUT,
        "/api/products/9999",
        Some(json!({ "name": "Ghost" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[sqlx::test]
#[ignore = "requires a Postgres DATABASE_URL"]
async fn delete_removes_product_and_inventory(pool: PgPool) {
    let app = app(pool);
    let created = create_test_product(&app).await;
    let id = created["id"].as_i64().unwrap();

    let (status, _) = send(&app, Method::DELETE, &format!("/api/products/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, Method::GET, &format!("/api/products/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(&app, Method::GET, &format!("/api/inventory/products/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "Inventory not found for this product");

    let (status, _) = send(&app, Method::DELETE, &format!("/api/products/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[sqlx::test]
#[ignore = "requires a Postgres DATABASE_URL"]
async fn list_is_stable_across_reads(pool: PgPool) {
    let app = app(pool);
    create_test_product(&app).await;
    create_test_product(&app).await;

    let (_, first) = send(&app, Method::GET, "/api/products/", None).await;
    let (_, second) = send(&app, Method::GET, "/api/products", None).await;
    assert_eq!(first.as_array().unwrap().len(), 2);
    assert_eq!(first, second);

    let (_, paged) = send(&app, Method::GET, "/api/products/?skip=1&limit=5", None).await;
    assert_eq!(paged.as_array().unwrap().len(), 1);
}

// ── Inventory ─────────────────────────────────────────────────────────────────

#[sqlx::test]
#[ignore = "requires a Postgres DATABASE_URL"]
async fn stock_scenario_add_remove_and_reject(pool: PgPool) {
    let app = app(pool);
    let created = create_test_product(&app).await;
    let id = created["id"].as_i64().unwrap();
    let inventory_uri = format!("/api/inventory/products/{id}");
    let stock_uri = format!("{inventory_uri}/stock");

    let (status, body) = send(&app, Method::GET, &inventory_uri, None).await;
    assert_eq!(status, StatusCode::OK);
    let initial: Inventory = typed(body);
    assert_eq!(i64::from(initial.product_id), id);
    assert_eq!(initial.quantity, 0);

    tick().await;
    let (status, body) = send(&app, Method::POST, &stock_uri, Some(json!({ "quantity": 10 }))).await;
    assert_eq!(status, StatusCode::OK);
    let added: StockAdjusted = typed(body);
    assert_eq!(added.current_stock, 10);
    assert_eq!(added.message, "Added 10 units to stock");

    let (_, body) = send(&app, Method::GET, &inventory_uri, None).await;
    let after_add: Inventory = typed(body);
    assert_eq!(after_add.created_at, initial.created_at);
    assert!(after_add.updated_at > after_add.created_at);

    tick().await;
    let (status, body) = send(&app, Method::DELETE, &stock_uri, Some(json!({ "quantity": 5 }))).await;
    assert_eq!(status, StatusCode::OK);
    let removed: StockAdjusted = typed(body);
    assert_eq!(removed.current_stock, 5);
    assert_eq!(removed.message, "Removed 5 units from stock");

    let (_, body) = send(&app, Method::GET, &inventory_uri, None).await;
    let after_remove: Inventory = typed(body);
    assert!(after_remove.updated_at > after_add.updated_at);

    tick().await;
    let (status, body) = send(&app, Method::DELETE, &stock_uri, Some(json!({ "quantity": 15 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Not enough stock available");

    // Rejected removal leaves the row untouched
    let (_, body) = send(&app, Method::GET, &inventory_uri, None).await;
    let after_reject: Inventory = typed(body);
    assert_eq!(after_reject, after_remove);
}

#[sqlx::test]
#[ignore = "requires a Postgres DATABASE_URL"]
async fn stock_on_unknown_product_is_404(pool: PgPool) {
    let app = app(pool);
    let (status, body) = send(&app, Method::GET, "/api/inventory/products/4242", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "Inventory not found for this product");

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/inventory/products/4242/stock",
        Some(json!({ "quantity": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[sqlx::test]
#[ignore = "requires a Postgres DATABASE_URL"]
async fn non_positive_quantity_is_rejected(pool: PgPool) {
    let app = app(pool);
    let created = create_test_product(&app).await;
    let id = created["id"].as_i64().unwrap();

    let (status, _) = send(
        &app,
        Method::POST,
        &format!("/api/inventory/products/{id}/stock"),
        Some(json!({ "quantity": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[sqlx::test]
#[ignore = "requires a Postgres DATABASE_URL"]
async fn concurrent_adds_are_not_lost(pool: PgPool) {
    let app = app(pool.clone());
    let created = create_test_product(&app).await;
    let id = created["id"].as_i64().unwrap() as i32;

    let mut tasks = Vec::new();
    for n in [10, 5, 3, 7, 1, 4] {
        let pool = pool.clone();
        tasks.push(tokio::spawn(async move {
            db::adjust_stock(&pool, id, StockChange::Add(n)).await
        }));
    }
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    let inventory = db::fetch_inventory_by_product(&pool, id).await.unwrap();
    assert_eq!(inventory.quantity, 30);
}

#[sqlx::test]
#[ignore = "requires a Postgres DATABASE_URL"]
async fn concurrent_removes_never_oversell(pool: PgPool) {
    let app = app(pool.clone());
    let created = create_test_product(&app).await;
    let id = created["id"].as_i64().unwrap() as i32;
    db::adjust_stock(&pool, id, StockChange::Add(10)).await.unwrap();

    let mut tasks = Vec::new();
    for _ in 0..4 {
        let pool = pool.clone();
        tasks.push(tokio::spawn(async move {
            db::adjust_stock(&pool, id, StockChange::Remove(3)).await
        }));
    }
    let mut succeeded = 0;
    for task in tasks {
        if task.await.unwrap().is_ok() {
            succeeded += 1;
        }
    }

    assert_eq!(succeeded, 3);
    let inventory = db::fetch_inventory_by_product(&pool, id).await.unwrap();
    assert_eq!(inventory.quantity, 1);
}

// ── Seed ──────────────────────────────────────────────────────────────────────

#[sqlx::test]
#[ignore = "requires a Postgres DATABASE_URL"]
async fn seed_runs_only_on_empty_catalog(pool: PgPool) {
    assert_eq!(seed::seed_if_empty(&pool).await.unwrap(), seed::CATALOG.len());
    assert_eq!(seed::seed_if_empty(&pool).await.unwrap(), 0);

    let products = db::fetch_all_products(&pool, &Default::default()).await.unwrap();
    assert_eq!(products.len(), seed::CATALOG.len());
    assert!(products
        .iter()
        .all(|p| p.inventory.as_ref().map(|i| i.quantity) == Some(seed::INITIAL_STOCK)));
}

#[sqlx::test]
#[ignore = "requires a Postgres DATABASE_URL"]
async fn service_endpoints_respond(pool: PgPool) {
    let app = app(pool);
    let (status, body) = send(&app, Method::GET, "/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Welcome to Inventory Management System API");

    let (status, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[sqlx::test]
#[ignore = "requires a Postgres DATABASE_URL"]
async fn products_table_carries_only_key_indexes(pool: PgPool) {
    let indexes: Vec<(String,)> =
        sqlx::query_as("SELECT indexname::text FROM pg_indexes WHERE tablename = 'products'")
            .fetch_all(&pool)
            .await
            .unwrap();
    assert_eq!(indexes, vec![("products_pkey".to_string(),)]);
}
