//! Payment API Handlers

use std::collections::HashMap;

use axum::{
    Json,
    extract::{Query, State},
};
use shared::ApiResponse;
use shared::models::Order;

use crate::core::ServerState;
use crate::orders::OrderFlowError;
use crate::utils::{AppResult, ok_with_message};

/// Gateway return/notify endpoint.
///
/// Verifies the signature, then routes to success or failure
/// confirmation. Safe to call repeatedly: replays settle into the
/// already-recorded outcome.
pub async fn callback(
    State(state): State<ServerState>,
    Query(params): Query<HashMap<String, String>>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let callback = state
        .gateway
        .parse_callback(&params)
        .map_err(OrderFlowError::from)?;

    if callback.success {
        let order = state.orders.confirm_online_payment_success(&callback).await?;
        Ok(ok_with_message(order, "Payment confirmed"))
    } else {
        let reason = format!("gateway response code {}", callback.response_code);
        let order = state
            .orders
            .confirm_online_payment_failure(callback.order_ref, &reason)
            .await?;
        Ok(ok_with_message(order, "Payment failure recorded"))
    }
}
