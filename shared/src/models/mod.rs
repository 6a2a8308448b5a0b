//! Data models
//!
//! Shared between storefront-server and API consumers.
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` (SQLite INTEGER PRIMARY KEY), timestamps are Unix
//! millis, money is `f64` in currency units.

pub mod cart;
pub mod order;
pub mod product;

// Re-exports
pub use cart::*;
pub use order::*;
pub use product::*;
