//! Shared types for the storefront services
//!
//! Common types used across crates: data models, the API response
//! envelope, and id/time utilities. DB row types gate their sqlx derives
//! behind the `db` feature so frontend-facing consumers stay light.

pub mod models;
pub mod response;
pub mod util;

// Re-exports
pub use response::{ApiResponse, PaginatedResponse, Pagination};
pub use serde::{Deserialize, Serialize};
