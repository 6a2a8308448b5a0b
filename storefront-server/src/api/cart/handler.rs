//! Cart API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};
use shared::ApiResponse;
use shared::models::{CartItem, CartLine, OwnerIdentity};

use crate::core::ServerState;
use crate::db::repository::cart;
use crate::utils::{AppError, AppResult, ok, ok_with_message};

/// Owner scope shared by cart endpoints.
///
/// A session id wins when both are present, mirroring checkout: a
/// customer logging in mid-session keeps the guest cart.
#[derive(Debug, Deserialize)]
pub struct CartOwner {
    pub user_id: Option<i64>,
    pub session_id: Option<String>,
}

impl CartOwner {
    fn identity(&self) -> AppResult<OwnerIdentity> {
        match (self.user_id, self.session_id.as_deref()) {
            (_, Some(sid)) => Ok(OwnerIdentity::Session(sid.to_string())),
            (Some(uid), None) => Ok(OwnerIdentity::User(uid)),
            (None, None) => Err(AppError::validation("user_id or session_id is required")),
        }
    }
}

/// Cart view: live-priced lines plus the running total
#[derive(Debug, Serialize)]
pub struct CartView {
    pub items: Vec<CartLine>,
    pub total_amount: f64,
}

/// Get the cart for one owner
pub async fn get_cart(
    State(state): State<ServerState>,
    Query(owner): Query<CartOwner>,
) -> AppResult<Json<ApiResponse<CartView>>> {
    let key = owner.identity()?.cart_key();
    let items = cart::find_by_identity(state.pool(), &key).await?;
    let total_amount = items.iter().map(CartLine::line_total).sum();
    Ok(ok(CartView {
        items,
        total_amount,
    }))
}

/// Empty the cart
pub async fn clear_cart(
    State(state): State<ServerState>,
    Query(owner): Query<CartOwner>,
) -> AppResult<Json<ApiResponse<()>>> {
    let key = owner.identity()?.cart_key();
    let mut conn = state.pool().acquire().await?;
    cart::clear(&mut conn, &key).await?;
    Ok(ok_with_message((), "Cart cleared"))
}

#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub user_id: Option<i64>,
    pub session_id: Option<String>,
    pub product_id: i64,
    pub quantity: i64,
}

/// Add a product to the cart, accumulating quantity on repeats
pub async fn add_item(
    State(state): State<ServerState>,
    Json(payload): Json<AddItemRequest>,
) -> AppResult<Json<ApiResponse<CartItem>>> {
    let owner = CartOwner {
        user_id: payload.user_id,
        session_id: payload.session_id.clone(),
    };
    let key = owner.identity()?.cart_key();
    let item = cart::add_item(state.pool(), &key, payload.product_id, payload.quantity).await?;
    Ok(ok(item))
}

#[derive(Debug, Deserialize)]
pub struct QuantityUpdate {
    pub user_id: Option<i64>,
    pub session_id: Option<String>,
    pub quantity: i64,
}

/// Set the quantity of one cart line
pub async fn set_quantity(
    State(state): State<ServerState>,
    Path(product_id): Path<i64>,
    Json(payload): Json<QuantityUpdate>,
) -> AppResult<Json<ApiResponse<()>>> {
    let owner = CartOwner {
        user_id: payload.user_id,
        session_id: payload.session_id.clone(),
    };
    let key = owner.identity()?.cart_key();
    cart::set_quantity(state.pool(), &key, product_id, payload.quantity).await?;
    Ok(ok(()))
}

/// Remove one product from the cart
pub async fn remove_item(
    State(state): State<ServerState>,
    Path(product_id): Path<i64>,
    Query(owner): Query<CartOwner>,
) -> AppResult<Json<ApiResponse<()>>> {
    let key = owner.identity()?.cart_key();
    cart::remove_item(state.pool(), &key, product_id).await?;
    Ok(ok(()))
}
