//! Cart API Module
//!
//! Cart maintenance for one owner identity (`user:<id>` / `session:<sid>`).
//! Checkout freezes these lines into immutable order items.

mod handler;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::core::ServerState;

/// Cart router
pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/cart", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::get_cart).delete(handler::clear_cart))
        .route("/items", post(handler::add_item))
        .route(
            "/items/{product_id}",
            put(handler::set_quantity).delete(handler::remove_item),
        )
}
