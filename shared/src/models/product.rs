//! Product Model
//!
//! Catalog administration is an external concern; the product table here
//! is the inventory substrate (price + stock) that orders freeze from.

use serde::{Deserialize, Serialize};

/// Product entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Product {
    pub id: i64,
    pub name: String,
    /// Current catalog price, in currency units
    pub price: f64,
    /// Units on hand; never driven negative by guarded decrements
    pub stock: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create product payload (test seeding and administrative import)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductCreate {
    pub name: String,
    pub price: f64,
    #[serde(default)]
    pub stock: i64,
}
