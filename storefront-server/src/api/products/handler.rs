//! Product API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use shared::models::{Product, ProductCreate};
use shared::{ApiResponse, PaginatedResponse};

use crate::core::ServerState;
use crate::db::repository::product;
use crate::utils::{AppError, AppResult, ok};

fn default_page() -> u32 {
    1
}

fn default_per_page() -> u32 {
    20
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

/// List products (paginated)
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<ApiResponse<PaginatedResponse<Product>>>> {
    let page = query.page.max(1);
    let per_page = query.per_page.max(1);
    let offset = (page as i64 - 1) * per_page as i64;
    let products = product::find_all(state.pool(), per_page as i64, offset).await?;
    let total = product::count_all(state.pool()).await?;
    Ok(ok(PaginatedResponse::new(
        products,
        page,
        per_page,
        total as u64,
    )))
}

/// Get product by id
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<Product>>> {
    let product = product::find_by_id(state.pool(), id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Product {id} not found")))?;
    Ok(ok(product))
}

/// Create a product (administrative import)
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<ProductCreate>,
) -> AppResult<Json<ApiResponse<Product>>> {
    let product = product::create(state.pool(), payload).await?;
    Ok(ok(product))
}

#[derive(Debug, Deserialize)]
pub struct StockUpdate {
    pub stock: i64,
}

/// Administrative stock set (restock, correction)
pub async fn update_stock(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<StockUpdate>,
) -> AppResult<Json<ApiResponse<Product>>> {
    product::update_stock(state.pool(), id, payload.stock).await?;
    let product = product::find_by_id(state.pool(), id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Product {id} not found")))?;
    Ok(ok(product))
}
