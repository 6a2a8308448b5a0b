//! Shipper API Handlers
//!
//! The shipper id arrives in the query or body rather than an auth
//! context; authentication is fronted by the API gateway upstream.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use shared::ApiResponse;
use shared::models::{Order, ShipperAction, ShipperStats};

use crate::core::ServerState;
use crate::db::repository::order;
use crate::utils::{AppResult, ok};

#[derive(Debug, Deserialize)]
pub struct ShipperQuery {
    pub shipper_id: i64,
}

/// Work queue: unassigned settled orders plus the ones this shipper is
/// already carrying
pub async fn work_queue(
    State(state): State<ServerState>,
    Query(query): Query<ShipperQuery>,
) -> AppResult<Json<ApiResponse<Vec<Order>>>> {
    let orders = order::find_dispatchable(state.pool(), query.shipper_id).await?;
    Ok(ok(orders))
}

fn default_limit() -> i64 {
    50
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub shipper_id: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

/// Orders this shipper has ever carried, newest first
pub async fn history(
    State(state): State<ServerState>,
    Query(query): Query<HistoryQuery>,
) -> AppResult<Json<ApiResponse<Vec<Order>>>> {
    let orders =
        order::find_by_shipper(state.pool(), query.shipper_id, query.limit, query.offset).await?;
    Ok(ok(orders))
}

/// Take an unassigned, settled order
pub async fn accept(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<ShipperAction>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let order = state.orders.accept_by_shipper(id, payload.shipper_id).await?;
    Ok(ok(order))
}

/// Confirm delivery of an online-paid order
pub async fn deliver(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<ShipperAction>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let order = state
        .orders
        .confirm_delivered_by_shipper(id, payload.shipper_id)
        .await?;
    Ok(ok(order))
}

/// Confirm COD delivery: cash collection and delivery in one move
pub async fn cod_delivered(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<ShipperAction>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let order = state
        .orders
        .confirm_cod_delivered(id, payload.shipper_id)
        .await?;
    Ok(ok(order))
}

/// Delivered COD totals for one shipper
pub async fn stats(
    State(state): State<ServerState>,
    Query(query): Query<ShipperQuery>,
) -> AppResult<Json<ApiResponse<ShipperStats>>> {
    let stats = order::shipper_stats(state.pool(), query.shipper_id).await?;
    Ok(ok(stats))
}
