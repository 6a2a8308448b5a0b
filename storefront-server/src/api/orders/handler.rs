//! Order API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};
use shared::models::{
    CodCheckout, OnlineCheckout, Order, OrderStatus, OrderWithItems, OwnerIdentity, PaymentStatus,
    StatusCounts, StatusUpdate,
};
use shared::{ApiResponse, PaginatedResponse};

use crate::core::ServerState;
use crate::db::repository::order::{self, OrderFilter, OrderSort};
use crate::utils::time::{day_end_millis, day_start_millis, parse_date};
use crate::utils::{AppError, AppResult, ok};

/// Online checkout response: the created order plus the gateway redirect
#[derive(Debug, Serialize)]
pub struct OnlineCheckoutResponse {
    #[serde(flatten)]
    pub order: OrderWithItems,
    pub payment_url: String,
}

/// Create a pending online order from the cart
pub async fn checkout_online(
    State(state): State<ServerState>,
    Json(payload): Json<OnlineCheckout>,
) -> AppResult<Json<ApiResponse<OnlineCheckoutResponse>>> {
    let (order, payment_url) = state.orders.checkout_online(payload).await?;
    Ok(ok(OnlineCheckoutResponse { order, payment_url }))
}

/// COD checkout: settle at the door, stock committed now
pub async fn checkout_cod(
    State(state): State<ServerState>,
    Json(payload): Json<CodCheckout>,
) -> AppResult<Json<ApiResponse<OrderWithItems>>> {
    let order = state.orders.checkout_cod(payload).await?;
    Ok(ok(order))
}

/// Get order detail by id
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<OrderWithItems>>> {
    let order = order::find_with_items(state.pool(), id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Order {id} not found")))?;
    Ok(ok(order))
}

/// Get order detail by human-facing order number
pub async fn get_by_order_no(
    State(state): State<ServerState>,
    Path(order_no): Path<String>,
) -> AppResult<Json<ApiResponse<OrderWithItems>>> {
    let order = order::find_by_order_no(state.pool(), &order_no)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Order {order_no} not found")))?;
    let detail = order::find_with_items(state.pool(), order.id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Order {order_no} not found")))?;
    Ok(ok(detail))
}

#[derive(Debug, Serialize)]
pub struct PaymentUrlResponse {
    pub payment_url: String,
}

/// Fresh gateway redirect for an order still awaiting payment
pub async fn payment_url(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<PaymentUrlResponse>>> {
    let url = state.orders.payment_url(id).await?;
    Ok(ok(PaymentUrlResponse { payment_url: url }))
}

fn default_page() -> u32 {
    1
}

fn default_per_page() -> u32 {
    20
}

/// Query params for listing orders, all filters optional
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub status: Option<OrderStatus>,
    pub payment_status: Option<PaymentStatus>,
    pub user_id: Option<i64>,
    pub session_id: Option<String>,
    /// Exact recipient phone match
    pub phone: Option<String>,
    /// Fuzzy recipient name match
    pub q: Option<String>,
    pub transaction_id: Option<String>,
    /// Inclusive start date (YYYY-MM-DD)
    pub from: Option<String>,
    /// Inclusive end date (YYYY-MM-DD)
    pub to: Option<String>,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_per_page")]
    pub per_page: u32,
    /// Sort column: created_at (default) | total_amount
    pub sort: Option<String>,
    /// Sort direction: desc (default) | asc
    pub order: Option<String>,
}

impl ListQuery {
    fn into_filter(self) -> AppResult<OrderFilter> {
        let created_from = match self.from.as_deref() {
            Some(d) => Some(day_start_millis(parse_date(d)?)),
            None => None,
        };
        let created_to = match self.to.as_deref() {
            Some(d) => Some(day_end_millis(parse_date(d)?)),
            None => None,
        };
        Ok(OrderFilter {
            status: self.status,
            payment_status: self.payment_status,
            user_id: self.user_id,
            session_id: self.session_id,
            recipient_phone: self.phone,
            recipient_name: self.q,
            transaction_id: self.transaction_id,
            created_from,
            created_to,
            sort: OrderSort::from_params(self.sort.as_deref(), self.order.as_deref()),
            page: self.page,
            per_page: self.per_page,
        })
    }
}

/// List orders (paginated, filtered)
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<ApiResponse<PaginatedResponse<Order>>>> {
    let filter = query.into_filter()?;
    let page = filter.page.max(1);
    let per_page = filter.per_page.max(1);
    let (orders, total) = order::list(state.pool(), &filter).await?;
    Ok(ok(PaginatedResponse::new(orders, page, per_page, total)))
}

/// Owner scope for the status-counts endpoint
#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    pub user_id: Option<i64>,
    pub session_id: Option<String>,
}

/// Per-status order counts, global or scoped to one owner.
///
/// A user id wins over a session id here: stats follow the account, not
/// the browsing session.
pub async fn status_counts(
    State(state): State<ServerState>,
    Query(query): Query<StatsQuery>,
) -> AppResult<Json<ApiResponse<StatusCounts>>> {
    let counts = match (query.user_id, query.session_id) {
        (Some(uid), _) => {
            order::count_by_status_for_owner(state.pool(), &OwnerIdentity::User(uid)).await?
        }
        (None, Some(sid)) => {
            order::count_by_status_for_owner(state.pool(), &OwnerIdentity::Session(sid)).await?
        }
        (None, None) => order::count_by_status(state.pool()).await?,
    };
    Ok(ok(counts))
}

/// Administrative status override, validated against the transition matrix
pub async fn update_status(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<StatusUpdate>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let order = state.orders.admin_set_status(id, payload.status).await?;
    Ok(ok(order))
}
