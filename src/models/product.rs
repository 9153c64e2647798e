use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::models::Inventory;

/// Catalog entry. Stock lives in the separate `inventory` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Product {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Product as returned by the API, with its stock record attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductDetails {
    #[serde(flatten)]
    pub product: Product,
    pub inventory: Option<Inventory>,
}

/// Flat row of `products LEFT JOIN inventory`.
#[derive(Debug, sqlx::FromRow)]
pub struct ProductInventoryRow {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub inventory_id: Option<i32>,
    pub quantity: Option<i32>,
    pub inventory_created_at: Option<DateTime<Utc>>,
    pub inventory_updated_at: Option<DateTime<Utc>>,
}

impl From<ProductInventoryRow> for ProductDetails {
    fn from(row: ProductInventoryRow) -> Self {
        let inventory = match (
            row.inventory_id,
            row.quantity,
            row.inventory_created_at,
            row.inventory_updated_at,
        ) {
            (Some(id), Some(quantity), Some(created_at), Some(updated_at)) => Some(Inventory {
                id,
                product_id: row.id,
                quantity,
                created_at,
                updated_at,
            }),
            _ => None,
        };

        ProductDetails {
            product: Product {
                id: row.id,
                name: row.name,
                description: row.description,
                price: row.price,
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
            inventory,
        }
    }
}

// ── Request payloads ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct CreateProduct {
    pub name: String,
    pub description: String,
    pub price: f64,
}

impl CreateProduct {
    pub fn validate(&self) -> AppResult<()> {
        require_text("name", &self.name)?;
        require_text("description", &self.description)?;
        require_price(self.price)
    }
}

/// Partial update: absent fields keep their stored values.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProduct {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
}

impl UpdateProduct {
    pub fn validate(&self) -> AppResult<()> {
        if let Some(name) = &self.name {
            require_text("name", name)?;
        }
        if let Some(description) = &self.description {
            require_text("description", description)?;
        }
        if let Some(price) = self.price {
            require_price(price)?;
        }
        Ok(())
    }

    /// Overlay the supplied fields onto `existing`.
    pub fn merge_into(&self, existing: &Product) -> (String, String, f64) {
        (
            self.name.clone().unwrap_or_else(|| existing.name.clone()),
            self.description
                .clone()
                .unwrap_or_else(|| existing.description.clone()),
            self.price.unwrap_or(existing.price),
        )
    }
}

fn require_text(field: &str, value: &str) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::BadRequest(format!("{field} must not be empty")));
    }
    Ok(())
}

fn require_price(price: f64) -> AppResult<()> {
    if !price.is_finite() || price < 0.0 {
        return Err(AppError::BadRequest("price must be >= 0".to_string()));
    }
    Ok(())
}

// ── Query parameters ──────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Default)]
pub struct ProductFilters {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

impl ProductFilters {
    pub const DEFAULT_LIMIT: i64 = 100;
    pub const MAX_LIMIT: i64 = 1000;

    pub fn offset(&self) -> i64 {
        self.skip.unwrap_or(0).max(0)
    }

    pub fn limit(&self) -> i64 {
        self.limit
            .unwrap_or(Self::DEFAULT_LIMIT)
            .clamp(0, Self::MAX_LIMIT)
    }
}
