use chrono::Utc;
use sqlx::{postgres::PgExecutor, PgPool};
use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::models::{Inventory, StockChange};

fn not_found() -> AppError {
    AppError::NotFound("Inventory not found for this product".to_string())
}

pub async fn insert_inventory<'e>(
    executor: impl PgExecutor<'e>,
    product_id: i32,
    quantity: i32,
) -> AppResult<Inventory> {
    let inventory = sqlx::query_as::<_, Inventory>(
        r#"
        INSERT INTO inventory (product_id, quantity)
        VALUES ($1, $2)
        RETURNING id, product_id, quantity, created_at, updated_at
        "#,
    )
    .bind(product_id)
    .bind(quantity)
    .fetch_one(executor)
    .await?;

    Ok(inventory)
}

pub async fn fetch_inventory_by_product(pool: &PgPool, product_id: i32) -> AppResult<Inventory> {
    sqlx::query_as::<_, Inventory>(
        "SELECT id, product_id, quantity, created_at, updated_at
         FROM inventory WHERE product_id = $1",
    )
    .bind(product_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(not_found)
}

/// Read-modify-write of a product's stock in one transaction.
///
/// The inventory row is locked with `FOR UPDATE`, so concurrent adjustments
/// of the same product queue behind each other instead of reading a stale
/// quantity. A rejected change returns before the update and the dropped
/// transaction rolls back.
pub async fn adjust_stock(pool: &PgPool, product_id: i32, change: StockChange) -> AppResult<Inventory> {
    let mut tx = pool.begin().await?;

    let current = sqlx::query_as::<_, Inventory>(
        "SELECT id, product_id, quantity, created_at, updated_at
         FROM inventory WHERE product_id = $1 FOR UPDATE",
    )
    .bind(product_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(not_found)?;

    let quantity = change.apply(current.quantity)?;

    let updated = sqlx::query_as::<_, Inventory>(
        r#"
        UPDATE inventory
        SET quantity   = $1,
            updated_at = $2
        WHERE id = $3
        RETURNING id, product_id, quantity, created_at, updated_at
        "#,
    )
    .bind(quantity)
    .bind(Utc::now())
    .bind(current.id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    debug!(
        product_id,
        before = current.quantity,
        after = updated.quantity,
        "Stock adjusted"
    );

    Ok(updated)
}
