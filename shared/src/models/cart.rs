//! Cart Model

use serde::{Deserialize, Serialize};

/// Cart row: one product for one owner identity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct CartItem {
    pub id: i64,
    /// Canonical owner key (`user:<id>` / `session:<sid>`)
    pub identity: String,
    pub product_id: i64,
    pub quantity: i64,
    pub created_at: i64,
}

/// Cart line joined with live product data at read time.
///
/// Order creation snapshots these into immutable line items, so the
/// price here is "today's price" by construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct CartLine {
    pub product_id: i64,
    pub product_name: String,
    pub unit_price: f64,
    pub quantity: i64,
}

impl CartLine {
    pub fn line_total(&self) -> f64 {
        self.unit_price * self.quantity as f64
    }
}
