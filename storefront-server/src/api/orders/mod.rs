//! Order API Module
//!
//! Checkout, lookup, listing and the administrative status override.
//! All mutations go through [`OrderLifecycleManager`](crate::orders::OrderLifecycleManager).

mod handler;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::core::ServerState;

/// Order router
pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/orders", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        // Checkout
        .route("/checkout/online", post(handler::checkout_online))
        .route("/checkout/cod", post(handler::checkout_cod))
        // Listing and stats (fixed segments before `/{id}`)
        .route("/", get(handler::list))
        .route("/stats/status-counts", get(handler::status_counts))
        .route("/number/{order_no}", get(handler::get_by_order_no))
        // Detail
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/payment-url", get(handler::payment_url))
        // Admin override
        .route("/{id}/status", put(handler::update_status))
}
