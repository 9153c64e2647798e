use chrono::Utc;
use sqlx::{postgres::PgExecutor, PgPool};

use crate::db::insert_inventory;
use crate::error::{AppError, AppResult};
use crate::models::*;

const DETAILS_SELECT: &str = r#"
    SELECT p.id, p.name, p.description, p.price, p.created_at, p.updated_at,
           i.id AS inventory_id, i.quantity,
           i.created_at AS inventory_created_at, i.updated_at AS inventory_updated_at
    FROM products p
    LEFT JOIN inventory i ON i.product_id = p.id
"#;

fn not_found(id: i32) -> AppError {
    AppError::NotFound(format!("Product {} not found", id))
}

pub async fn fetch_all_products(pool: &PgPool, filters: &ProductFilters) -> AppResult<Vec<ProductDetails>> {
    let rows = sqlx::query_as::<_, ProductInventoryRow>(&format!(
        "{DETAILS_SELECT} ORDER BY p.id ASC LIMIT $1 OFFSET $2"
    ))
    .bind(filters.limit())
    .bind(filters.offset())
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(ProductDetails::from).collect())
}

async fn fetch_details<'e>(executor: impl PgExecutor<'e>, id: i32) -> AppResult<ProductDetails> {
    sqlx::query_as::<_, ProductInventoryRow>(&format!("{DETAILS_SELECT} WHERE p.id = $1"))
        .bind(id)
        .fetch_optional(executor)
        .await?
        .map(ProductDetails::from)
        .ok_or_else(|| not_found(id))
}

pub async fn fetch_product_by_id(pool: &PgPool, id: i32) -> AppResult<ProductDetails> {
    fetch_details(pool, id).await
}

pub async fn insert_product_row<'e>(
    executor: impl PgExecutor<'e>,
    name: &str,
    description: &str,
    price: f64,
) -> AppResult<Product> {
    let product = sqlx::query_as::<_, Product>(
        r#"
        INSERT INTO products (name, description, price)
        VALUES ($1, $2, $3)
        RETURNING id, name, description, price, created_at, updated_at
        "#,
    )
    .bind(name)
    .bind(description)
    .bind(price)
    .fetch_one(executor)
    .await?;

    Ok(product)
}

/// Insert the product together with its empty stock record.
pub async fn insert_product(pool: &PgPool, payload: &CreateProduct) -> AppResult<ProductDetails> {
    let mut tx = pool.begin().await?;

    let product =
        insert_product_row(&mut *tx, &payload.name, &payload.description, payload.price).await?;

    let inventory = insert_inventory(&mut *tx, product.id, 0).await?;

    tx.commit().await?;

    Ok(ProductDetails {
        product,
        inventory: Some(inventory),
    })
}

pub async fn update_product(pool: &PgPool, id: i32, payload: &UpdateProduct) -> AppResult<ProductDetails> {
    let mut tx = pool.begin().await?;

    // Lock the row so the merge below sees the value it overwrites
    let existing = sqlx::query_as::<_, Product>(
        "SELECT id, name, description, price, created_at, updated_at
         FROM products WHERE id = $1 FOR UPDATE",
    )
    .bind(id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| not_found(id))?;

    let (name, description, price) = payload.merge_into(&existing);

    sqlx::query(
        r#"
        UPDATE products
        SET name        = $1,
            description = $2,
            price       = $3,
            updated_at  = $4
        WHERE id = $5
        "#,
    )
    .bind(name)
    .bind(description)
    .bind(price)
    .bind(Utc::now())
    .bind(id)
    .execute(&mut *tx)
    .await?;

    let details = fetch_details(&mut *tx, id).await?;
    tx.commit().await?;

    Ok(details)
}

/// Delete a product. Its inventory row goes with it (`ON DELETE CASCADE`).
pub async fn delete_product(pool: &PgPool, id: i32) -> AppResult<()> {
    let mut tx = pool.begin().await?;

    let result = sqlx::query("DELETE FROM products WHERE id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    if result.rows_affected() == 0 {
        return Err(not_found(id));
    }

    tx.commit().await?;
    Ok(())
}
