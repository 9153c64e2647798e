use sqlx::PgPool;
use tracing::info;

use crate::db::{count_products, insert_inventory, insert_product_row};
use crate::error::AppResult;

pub struct SeedProduct {
    pub name: &'static str,
    pub description: &'static str,
    pub price: f64,
}

/// Starting stock for every seeded product.
pub const INITIAL_STOCK: i32 = 10;

pub static CATALOG: &[SeedProduct] = &[
    SeedProduct {
        name: "Laptop",
        description: "High-performance laptop for professional use",
        price: 1299.99,
    },
    SeedProduct {
        name: "Smartphone",
        description: "Latest model smartphone with advanced features",
        price: 799.99,
    },
    SeedProduct {
        name: "Headphones",
        description: "Wireless noise-canceling headphones",
        price: 199.99,
    },
    SeedProduct {
        name: "Monitor",
        description: "27-inch 4K LED Monitor",
        price: 349.99,
    },
    SeedProduct {
        name: "Keyboard",
        description: "Mechanical gaming keyboard with RGB lighting",
        price: 129.99,
    },
];

/// Insert the example catalog, each product with `INITIAL_STOCK` units.
/// Does nothing when any product already exists. Returns the number of
/// products inserted.
pub async fn seed_if_empty(pool: &PgPool) -> AppResult<usize> {
    if count_products(pool).await? > 0 {
        info!("Database already has products, skipping seed");
        return Ok(0);
    }

    info!("Seeding {} products...", CATALOG.len());
    let mut tx = pool.begin().await?;

    for item in CATALOG {
        let product =
            insert_product_row(&mut *tx, item.name, item.description, item.price).await?;
        insert_inventory(&mut *tx, product.id, INITIAL_STOCK).await?;
    }

    tx.commit().await?;
    info!("Seeding complete. Total: {} products", CATALOG.len());
    Ok(CATALOG.len())
}
