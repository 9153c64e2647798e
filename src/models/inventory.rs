use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// Stock record owned by exactly one product. `quantity` never goes below zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Inventory {
    pub id: i32,
    pub product_id: i32,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of the add/remove stock endpoints.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct StockUpdate {
    pub quantity: i32,
}

impl StockUpdate {
    pub fn validate(&self) -> AppResult<()> {
        if self.quantity <= 0 {
            return Err(AppError::BadRequest("quantity must be > 0".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockChange {
    Add(i32),
    Remove(i32),
}

impl StockChange {
    /// Quantity after applying the change to `current`.
    pub fn apply(self, current: i32) -> AppResult<i32> {
        match self {
            StockChange::Add(n) => current
                .checked_add(n)
                .ok_or_else(|| AppError::BadRequest("stock quantity out of range".to_string())),
            StockChange::Remove(n) if n > current => Err(AppError::InsufficientStock {
                available: current,
                requested: n,
            }),
            StockChange::Remove(n) => Ok(current - n),
        }
    }

    pub fn message(self) -> String {
        match self {
            StockChange::Add(n) => format!("Added {n} units to stock"),
            StockChange::Remove(n) => format!("Removed {n} units from stock"),
        }
    }
}

/// Response of a successful stock adjustment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockAdjusted {
    pub message: String,
    pub current_stock: i32,
}
